pub mod crawler;
pub mod web;

pub use crawler::Crawler;
pub use web::{Browser, BrowserLauncher, Renderer, WebDriverBrowser, WebDriverLauncher};

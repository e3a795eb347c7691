pub mod html;

#[cfg(test)]
mod tests;

pub use html::{ProductExtractor, compile_selector, product_cards};

mod checkout;
mod pages;
mod resume;
mod tarot;

pub use checkout::{CheckoutBody, CheckoutResponse, checkout_handler};
pub use pages::{
    canceled_handler, cards_handler, index_handler, products_handler, read_url, success_handler,
};
pub use resume::read_handler;
pub use tarot::{CardRef, TarotBody, tarot_handler};

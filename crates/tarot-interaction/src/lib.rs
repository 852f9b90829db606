//! Adapters to external services: the Gemini text-generation API and Stripe
//! Checkout.

pub mod gemini_api_agent;
pub mod stripe_checkout;

pub use gemini_api_agent::GeminiApiAgent;
pub use stripe_checkout::StripeCheckoutClient;

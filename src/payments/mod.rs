//! Payment domain: checkout rails, verification, settlement, payouts

mod chain;
mod commission;
mod paypal;
mod provider;
mod service;

pub use chain::ChainClient;
pub use commission::CommissionService;
pub use paypal::PaypalClient;
pub use provider::{PaymentCheck, PaymentInitiation, PaymentProvider};
pub use service::{
    PaymentError, PaymentService, METHOD_BALANCE, METHOD_PAYPAL, METHOD_USDT_ETH, METHOD_USDT_TRON,
};

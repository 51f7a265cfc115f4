//! Wire-level and domain types of the gateway client

pub mod error;
pub mod identity;
pub mod merchant;
pub mod order;
pub mod request;
pub mod response;
pub mod settlement;
pub mod status;

pub use error::GatewayError;
pub use identity::{Balance, ClientStatusRequest, ClientStatusResponse, IdentityDocument};
pub use merchant::{MerchantAccount, SplitAccount};
pub use order::{AdditionalInfo, CaptureCompat, Order};
pub use request::{InvoiceRequest, PaymentRequest, RequestEnvelope};
pub use response::{CheckoutEnvelope, CheckoutResponse, ResponseCode, StatusEnvelope};
pub use settlement::{
    Receiver, Requisites, SettlementOrder, SettlementRequestEnvelope, SettlementResponseEnvelope,
};
pub use status::{
    CaptureStatus, Currency, Endpoint, OrderStatus, ResponseStatus, ReverseStatus,
};

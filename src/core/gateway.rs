//! Gateway operations facade
//!
//! [`Gateway`] composes the signing codec, the classifiers, the allocator,
//! and the transport into the caller-facing payment operations. It holds no
//! mutable state: one instance is safely shared across concurrent callers,
//! and every operation is a single request/response exchange with no
//! retries and no idempotency cache.

use crate::config::GatewayConfig;
use crate::core::classifier;
use crate::core::signature;
use crate::core::split;
use crate::recorder::{Recorder, Tags};
use crate::transport::{ApiVersion, Sender, WireRequest};
use crate::types::error::GatewayError;
use crate::types::identity::{Balance, ClientStatusRequest, ClientStatusResponse, IdentityDocument};
use crate::types::merchant::MerchantAccount;
use crate::types::order::Order;
use crate::types::request::{InvoiceRequest, PaymentRequest, RequestEnvelope};
use crate::types::response::{CheckoutEnvelope, StatusEnvelope};
use crate::types::settlement::{Receiver, SettlementOrder, SettlementRequestEnvelope, SettlementResponseEnvelope};
use crate::types::status::{Currency, Endpoint};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;
use uuid::Uuid;

/// Which of the two account secrets signs an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SigningKey {
    /// `merchant_key`: verification, status, payments, holds, captures,
    /// refunds, settlement
    Payment,
    /// `credit_key`: withdrawals only
    Credit,
}

impl SigningKey {
    fn secret<'a>(&self, account: &'a MerchantAccount) -> &'a str {
        match self {
            SigningKey::Payment => &account.merchant_key,
            SigningKey::Credit => &account.credit_key,
        }
    }
}

/// The gateway client
pub struct Gateway {
    sender: Arc<dyn Sender>,
    recorder: Option<Arc<dyn Recorder>>,
    config: GatewayConfig,
}

impl Gateway {
    /// Create a client over the given transport
    pub fn new(sender: Arc<dyn Sender>, config: GatewayConfig) -> Self {
        Gateway {
            sender,
            recorder: None,
            config,
        }
    }

    /// Attach a traffic recorder
    pub fn with_recorder(mut self, recorder: Arc<dyn Recorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Create a card verification link
    ///
    /// Registers a small charge-and-void order with `verification=Y` and
    /// `required_rectoken=Y` and returns the hosted checkout URL the
    /// cardholder completes it on. The amount, description, and lifetime
    /// come from the configuration; an explicit invoice lifetime overrides
    /// the configured one.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport, decoding, or gateway failure,
    /// including a successful envelope without a URL.
    pub async fn verification_link(
        &self,
        invoice: &InvoiceRequest,
        account: &MerchantAccount,
        email: Option<&str>,
    ) -> Result<String, GatewayError> {
        let mut request = self.base_request(invoice, account);
        request.amount = Some(self.config.verification_amount.to_string());
        request.currency = Some(Currency::UAH.as_str().to_string());
        request.order_desc = Some(self.config.verification_description.clone());
        request.verification = Some("Y".to_string());
        request.required_rectoken = Some("Y".to_string());
        request.merchant_data = Some("/card verification".to_string());
        request.sender_email = email.map(str::to_string);
        if !account.design_id.is_empty() {
            request.design_id = Some(account.design_id.clone());
        }
        let lifetime = invoice
            .payment_lifetime
            .unwrap_or(self.config.verification_lifetime);
        request.lifetime = Some(lifetime.as_secs().to_string());

        let raw = self
            .post_v1(Endpoint::CheckoutUrl, &mut request, account, SigningKey::Payment)
            .await?;
        let envelope: CheckoutEnvelope = serde_json::from_slice(&raw)
            .map_err(|e| GatewayError::serialization(e.to_string()).with_response(&raw))?;
        classifier::classify_checkout(envelope.response).map_err(|e| e.with_response(&raw))
    }

    /// Look up the current snapshot of an order
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport, decoding, or lookup failure.
    /// A declined or expired order is a *successful* lookup; inspect the
    /// returned snapshot's predicates.
    pub async fn status(
        &self,
        invoice: &InvoiceRequest,
        account: &MerchantAccount,
    ) -> Result<Order, GatewayError> {
        let mut request = self.base_request(invoice, account);
        self.post_order(Endpoint::OrderStatus, &mut request, account, SigningKey::Payment)
            .await
    }

    /// Charge a stored card immediately (no preauth)
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] when the invoice carries no
    /// payment card token, otherwise transport/decoding/gateway failures.
    pub async fn payment(
        &self,
        invoice: &InvoiceRequest,
        account: &MerchantAccount,
    ) -> Result<Order, GatewayError> {
        let mut request = self.charge_request(invoice, account, "N")?;
        request.merchant_data = Some(self.merchant_data("straight/", invoice, account));
        self.post_order(Endpoint::Recurring, &mut request, account, SigningKey::Payment)
            .await
    }

    /// Reserve funds on a stored card (preauth)
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] when the invoice carries no
    /// payment card token, otherwise transport/decoding/gateway failures.
    pub async fn hold(
        &self,
        invoice: &InvoiceRequest,
        account: &MerchantAccount,
    ) -> Result<Order, GatewayError> {
        let mut request = self.charge_request(invoice, account, "Y")?;
        request.merchant_data = Some(self.merchant_data("hold/", invoice, account));
        self.post_order(Endpoint::Recurring, &mut request, account, SigningKey::Payment)
            .await
    }

    /// Finalize a previously held amount
    ///
    /// Partial capture is allowed; the invoice amount is the amount to
    /// capture, not the amount originally held.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport, decoding, or gateway failure.
    pub async fn capture(
        &self,
        invoice: &InvoiceRequest,
        account: &MerchantAccount,
    ) -> Result<Order, GatewayError> {
        let mut request = self.amount_request(invoice, account);
        self.post_order(Endpoint::Capture, &mut request, account, SigningKey::Payment)
            .await
    }

    /// Reverse a charge or hold, fully or partially
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport, decoding, or gateway failure.
    pub async fn refund(
        &self,
        invoice: &InvoiceRequest,
        account: &MerchantAccount,
    ) -> Result<Order, GatewayError> {
        let mut request = self.amount_request(invoice, account);
        self.post_order(Endpoint::Reverse, &mut request, account, SigningKey::Payment)
            .await
    }

    /// Send funds to a card (P2P credit)
    ///
    /// Signed with the account's credit key. The receiving card is named
    /// either by a stored token or by a raw card number.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] when the invoice names no
    /// receiving card, otherwise transport/decoding/gateway failures.
    pub async fn credit(
        &self,
        invoice: &InvoiceRequest,
        account: &MerchantAccount,
    ) -> Result<Order, GatewayError> {
        let mut request = self.amount_request(invoice, account);
        match (&invoice.withdrawal_card_token, &invoice.withdrawal_card_number) {
            (Some(token), _) => request.receiver_rectoken = Some(token.clone()),
            (None, Some(number)) => request.receiver_card_number = Some(number.clone()),
            (None, None) => {
                return Err(GatewayError::configuration(
                    "withdrawal requires a receiver card token or number",
                ))
            }
        }
        request.merchant_data = Some(self.merchant_data("withdraw/", invoice, account));
        if !account.merchant_string.is_empty() {
            request.order_desc = Some(account.merchant_string.clone());
        }
        self.post_order(Endpoint::P2pCredit, &mut request, account, SigningKey::Credit)
            .await
    }

    /// Settle a captured order across the account's split receivers
    ///
    /// The flow is: validate the split configuration, fetch the order
    /// status, gate on the capture state, allocate per-receiver shares with
    /// exact reconciliation, and post the settlement on the 2.0 surface.
    /// Nothing is sent when any local step fails.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] for split-set violations,
    /// [`GatewayError::OrderNotCaptured`] when the capture gate fails,
    /// [`GatewayError::SplitAllocation`] when shares do not reconcile, and
    /// transport/decoding/gateway failures from either exchange.
    pub async fn split(
        &self,
        invoice: &InvoiceRequest,
        account: &MerchantAccount,
    ) -> Result<SettlementOrder, GatewayError> {
        account.validate_split_accounts()?;

        let order_id = invoice.invoice_id_string().unwrap_or_default();
        let order = self.status(invoice, account).await?;
        if !order.captured_with(self.config.capture_compat) {
            return Err(GatewayError::OrderNotCaptured { order_id });
        }

        let allocations =
            split::allocate(&order_id, invoice.amount_minor(), &account.split_accounts)?;

        let settlement = SettlementOrder {
            order_id: invoice.invoice_id_string(),
            operation_id: invoice.invoice_id_string(),
            merchant_id: Some(account.merchant_id_int()),
            order_type: Some("settlement".to_string()),
            amount: Some(invoice.amount_string()),
            currency: Some(Currency::UAH.as_str().to_string()),
            order_desc: (!account.merchant_string.is_empty())
                .then(|| account.merchant_string.clone()),
            rectoken: invoice.payment_card_token.clone(),
            server_callback_url: self.callback_url(invoice),
            receiver: allocations
                .into_iter()
                .map(|a| Receiver::merchant(a.merchant_id, a.amount, a.description))
                .collect(),
            ..Default::default()
        };

        self.post_settlement(&settlement, account).await
    }

    /// Refund a settled split order
    ///
    /// The gateway reverses the settlement and reports the reversal state
    /// inside the decoded order. A reply whose reverse status is neither
    /// `approved` nor `success` is rejected even when the envelope itself
    /// is successful.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ReversalRejected`] for unsettled reversals,
    /// plus transport/decoding/gateway failures.
    pub async fn split_refund(
        &self,
        invoice: &InvoiceRequest,
        account: &MerchantAccount,
    ) -> Result<SettlementOrder, GatewayError> {
        let settlement = SettlementOrder {
            order_id: invoice.invoice_id_string(),
            merchant_id: Some(account.merchant_id_int()),
            amount: Some(invoice.amount_string()),
            currency: Some(Currency::UAH.as_str().to_string()),
            server_callback_url: self.callback_url(invoice),
            ..Default::default()
        };

        let order = self.post_settlement(&settlement, account).await?;

        match order.reverse_status {
            Some(status) if status.is_settled() => Ok(order),
            other => Err(GatewayError::ReversalRejected {
                status: other
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "absent".to_string()),
                description: order.response_description.clone().unwrap_or_default(),
            }),
        }
    }

    /// Look up the identification state of a client by one identity document
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] on transport, decoding, or lookup failure,
    /// including a business error reported inside the reply.
    pub async fn identity_status(
        &self,
        document: &IdentityDocument,
        account: &MerchantAccount,
    ) -> Result<ClientStatusResponse, GatewayError> {
        let mut request = ClientStatusRequest::new(&account.merchant_id, document);
        signature::sign(&mut request, &account.merchant_key);

        // The identity surface posts and receives flat objects, no envelope
        let body = serde_json::to_vec(&request)
            .map_err(|e| GatewayError::serialization(e.to_string()))?;
        let raw = self
            .dispatch(Endpoint::ClientStatus, body, ApiVersion::V1, None)
            .await?;

        let response: ClientStatusResponse = serde_json::from_slice(&raw)
            .map_err(|e| GatewayError::serialization(e.to_string()).with_response(&raw))?;

        if let Some(error) = response.error {
            return Err(GatewayError::fatal_gateway(-1, error).with_response(&raw));
        }

        Ok(response)
    }

    /// Look up the current spending limits of an identified client
    ///
    /// # Errors
    ///
    /// As [`Gateway::identity_status`], plus a gateway error when the reply
    /// carries no balance.
    pub async fn identity_limits(
        &self,
        document: &IdentityDocument,
        account: &MerchantAccount,
    ) -> Result<Balance, GatewayError> {
        let response = self.identity_status(document, account).await?;
        response
            .balance
            .ok_or_else(|| GatewayError::fatal_gateway(-1, "reply carries no balance"))
    }

    /// Common fields of every v1 request
    fn base_request(&self, invoice: &InvoiceRequest, account: &MerchantAccount) -> PaymentRequest {
        PaymentRequest {
            order_id: invoice.invoice_id_string(),
            merchant_id: Some(account.merchant_id.clone()),
            server_callback_url: self.callback_url(invoice),
            ..Default::default()
        }
    }

    /// Base request plus amount and currency (capture, reverse, credit)
    fn amount_request(&self, invoice: &InvoiceRequest, account: &MerchantAccount) -> PaymentRequest {
        let mut request = self.base_request(invoice, account);
        request.amount = Some(invoice.amount_string());
        request.currency = Some(Currency::UAH.as_str().to_string());
        request
    }

    /// Token charge request shared by payments and holds
    fn charge_request(
        &self,
        invoice: &InvoiceRequest,
        account: &MerchantAccount,
        preauth: &str,
    ) -> Result<PaymentRequest, GatewayError> {
        let token = invoice
            .payment_card_token
            .clone()
            .ok_or_else(|| GatewayError::configuration("a payment card token is required"))?;

        let mut request = self.amount_request(invoice, account);
        request.preauth = Some(preauth.to_string());
        request.rectoken = Some(token);
        if !account.merchant_string.is_empty() {
            request.order_desc = Some(account.merchant_string.clone());
        }
        if let Some(lifetime) = invoice.payment_lifetime {
            request.lifetime = Some(lifetime.as_secs().to_string());
        }
        Ok(request)
    }

    /// Operation-tagged merchant-data metadata
    fn merchant_data(
        &self,
        prefix: &str,
        invoice: &InvoiceRequest,
        account: &MerchantAccount,
    ) -> String {
        format!(
            "{prefix}{}{}",
            account.description,
            invoice.extra_data_string()
        )
    }

    fn callback_url(&self, invoice: &InvoiceRequest) -> Option<String> {
        invoice
            .server_callback_url
            .clone()
            .or_else(|| self.config.callback_url.clone())
    }

    /// Sign, envelope, and dispatch a v1 request
    async fn post_v1(
        &self,
        endpoint: Endpoint,
        request: &mut PaymentRequest,
        account: &MerchantAccount,
        key: SigningKey,
    ) -> Result<Vec<u8>, GatewayError> {
        signature::sign(request, key.secret(account));
        let order_id = request.order_id.clone();
        let body = serde_json::to_vec(&RequestEnvelope::new(request))
            .map_err(|e| GatewayError::serialization(e.to_string()))?;
        self.dispatch(endpoint, body, ApiVersion::V1, order_id.as_deref())
            .await
    }

    /// v1 exchange returning a classified order snapshot
    async fn post_order(
        &self,
        endpoint: Endpoint,
        request: &mut PaymentRequest,
        account: &MerchantAccount,
        key: SigningKey,
    ) -> Result<Order, GatewayError> {
        let raw = self.post_v1(endpoint, request, account, key).await?;
        let envelope: StatusEnvelope = serde_json::from_slice(&raw)
            .map_err(|e| GatewayError::serialization(e.to_string()).with_response(&raw))?;
        classifier::classify_order(envelope.response).map_err(|e| e.with_response(&raw))
    }

    /// Encode, sign, and dispatch a 2.0 settlement exchange
    async fn post_settlement(
        &self,
        settlement: &SettlementOrder,
        account: &MerchantAccount,
    ) -> Result<SettlementOrder, GatewayError> {
        let mut envelope = SettlementRequestEnvelope::new(settlement)?;
        envelope.sign(&account.merchant_key);
        let body = serde_json::to_vec(&envelope)
            .map_err(|e| GatewayError::serialization(e.to_string()))?;

        let raw = self
            .dispatch(
                Endpoint::Settlement,
                body,
                ApiVersion::V2,
                settlement.order_id.as_deref(),
            )
            .await?;

        // Verification is advisory: a reply failing it is still processed,
        // matching the callback-verification contract elsewhere
        if let Ok(reply) = serde_json::from_slice::<SettlementResponseEnvelope>(&raw) {
            if !reply.signature_valid(&account.merchant_key) {
                warn!(
                    order_id = settlement.order_id.as_deref().unwrap_or(""),
                    "settlement reply failed signature verification"
                );
            }
        }

        classifier::classify_settlement(&raw)
    }

    /// One wire exchange with best-effort recording around it
    async fn dispatch(
        &self,
        endpoint: Endpoint,
        body: Vec<u8>,
        api_version: ApiVersion,
        order_id: Option<&str>,
    ) -> Result<Vec<u8>, GatewayError> {
        let request_id = Uuid::new_v4().to_string();
        let wire = WireRequest {
            url: self.config.url_for(endpoint),
            body,
            request_id,
            api_version,
        };

        let mut tags = Tags::new();
        if let Some(order_id) = order_id {
            tags.insert("order_id".to_string(), order_id.to_string());
        }

        self.record_request(order_id, &wire, &tags).await;
        let started = Instant::now();
        let outcome = self.sender.send(&wire).await;
        self.record_outcome(order_id, &wire, &tags, started, &outcome)
            .await;
        outcome
    }

    async fn record_request(&self, order_id: Option<&str>, wire: &WireRequest, tags: &Tags) {
        if let Some(recorder) = &self.recorder {
            if let Err(e) = recorder
                .record_request(order_id, &wire.request_id, &wire.body, tags)
                .await
            {
                warn!(request_id = %wire.request_id, error = %e, "cannot record request");
            }
        }
    }

    async fn record_outcome(
        &self,
        order_id: Option<&str>,
        wire: &WireRequest,
        tags: &Tags,
        started: Instant,
        outcome: &Result<Vec<u8>, GatewayError>,
    ) {
        let Some(recorder) = &self.recorder else {
            return;
        };

        let result = match outcome {
            Ok(raw) => {
                recorder
                    .record_response(order_id, &wire.request_id, raw, tags)
                    .await
            }
            Err(error) => {
                recorder
                    .record_error(order_id, &wire.request_id, &error.to_string(), tags)
                    .await
            }
        };
        if let Err(e) = result {
            warn!(request_id = %wire.request_id, error = %e, "cannot record outcome");
        }

        let mut metrics = Tags::new();
        metrics.insert("url".to_string(), wire.url.clone());
        metrics.insert(
            "duration_ms".to_string(),
            started.elapsed().as_millis().to_string(),
        );
        if let Err(e) = recorder
            .record_metrics(order_id, &wire.request_id, &metrics, tags)
            .await
        {
            warn!(request_id = %wire.request_id, error = %e, "cannot record metrics");
        }
    }
}

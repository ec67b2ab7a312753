//! Checkout
//!
//! A [`CheckoutSession`] owns one order being composed: its draft, its coupon
//! state and the payment state machine.
//!
//! ```text
//! Selecting -> Confirming -> Completing -> Submitting -> Succeeded
//!                  ^             |             |
//!                  |   canceled  |             v
//!                  +-------------+          Failed
//! ```
//!
//! Session state sits behind an async mutex that is never held across a call to
//! the pricing service, the payment provider or the orders service.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, oneshot};
use tracing::{Span, debug, info, warn};
use uuid::Uuid;

use crate::{
    coupons::{CouponError, CouponLedger, CouponResolution, interpret_coupon_response},
    draft::OrderDraft,
    location::LocationChoice,
    orders::{OrderConfirmation, OrderRequest, submit_order},
    payments::{
        CompletionMode, PaymentError, PaymentGateway, PaymentMethod, PaymentOutcome,
        PaymentRequest, TIMEOUT_REASON,
    },
    schedule::Schedule,
    services::ServiceSelection,
    totals::{Totals, compute_totals},
    validation::ValidationError,
};

pub mod context;
pub mod errors;

pub use context::{CheckoutContext, CheckoutSettings, DEFAULT_PAYMENT_TIMEOUT};
pub use errors::CheckoutError;

/// Failure reason recorded when an order submission is abandoned before the
/// server answered.
pub const SUBMISSION_INTERRUPTED: &str = "order submission was interrupted, please check your orders";

/// Where a session is in the payment flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutPhase {
    /// No payment method chosen yet.
    Selecting,

    /// A method is chosen and payment can start.
    Confirming,

    /// Waiting for the payment provider.
    Completing,

    /// Waiting for the order to be created.
    Submitting,

    /// The order was placed.
    Succeeded {
        /// Server-assigned order identifier.
        order_id: String,
    },

    /// The last payment or submission attempt failed. Payment can be retried.
    Failed {
        /// User-facing reason.
        reason: String,
    },
}

/// Result of a coupon check that did not fail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CouponCheck {
    /// The coupon was applied; these are the new totals.
    Applied(Totals),

    /// A newer check (or an edit) superseded this one; nothing changed.
    Superseded,
}

/// Result of a payment attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    /// Paid and the order was created.
    Placed(OrderConfirmation),

    /// The user dismissed the payment step.
    Canceled,
}

#[derive(Debug)]
struct SessionState {
    draft: OrderDraft,
    coupons: CouponLedger,
    method: Option<PaymentMethod>,
    phase: CheckoutPhase,
    cancel: Option<oneshot::Sender<()>>,
}

impl SessionState {
    fn ensure_editable(&self) -> Result<(), CheckoutError> {
        match self.phase {
            CheckoutPhase::Completing | CheckoutPhase::Submitting => Err(CheckoutError::InProgress),
            CheckoutPhase::Succeeded { .. } => Err(CheckoutError::SessionClosed),
            CheckoutPhase::Selecting | CheckoutPhase::Confirming | CheckoutPhase::Failed { .. } => {
                Ok(())
            }
        }
    }

    fn abandon(&mut self, step: PendingStep) {
        match step {
            PendingStep::CouponCheck(sequence) => self.coupons.abandon(sequence),
            PendingStep::Payment => {
                self.cancel = None;

                match self.phase {
                    CheckoutPhase::Completing => self.phase = CheckoutPhase::Confirming,
                    CheckoutPhase::Submitting => {
                        self.phase = CheckoutPhase::Failed {
                            reason: SUBMISSION_INTERRUPTED.to_string(),
                        };
                    }
                    CheckoutPhase::Selecting
                    | CheckoutPhase::Confirming
                    | CheckoutPhase::Succeeded { .. }
                    | CheckoutPhase::Failed { .. } => {}
                }
            }
        }
    }

    fn totals(&self, settings: &CheckoutSettings) -> Result<Totals, CheckoutError> {
        let service = self
            .draft
            .service()
            .ok_or(ValidationError::MissingService)?;

        Ok(compute_totals(
            service.unit_price(),
            service.quantity(),
            self.coupons.result(),
            &settings.tax_rate,
        )?)
    }
}

/// A session step that must be wound back if its caller stops waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingStep {
    CouponCheck(u64),
    Payment,
}

/// Winds back an outstanding step when the future driving it is dropped.
///
/// Disarm while holding the state lock, right after the step's own outcome has
/// been recorded.
struct AbandonGuard {
    state: Arc<Mutex<SessionState>>,
    step: Option<PendingStep>,
    provider: Option<Arc<dyn PaymentGateway>>,
}

impl AbandonGuard {
    fn new(state: &Arc<Mutex<SessionState>>, step: PendingStep) -> Self {
        Self {
            state: Arc::clone(state),
            step: Some(step),
            provider: None,
        }
    }

    /// Dismiss `provider` as well if abandoned before it answers.
    fn with_provider(mut self, provider: &Arc<dyn PaymentGateway>) -> Self {
        self.provider = Some(Arc::clone(provider));
        self
    }

    fn provider_settled(&mut self) {
        self.provider = None;
    }

    fn disarm(&mut self) {
        self.step = None;
        self.provider = None;
    }
}

impl Drop for AbandonGuard {
    fn drop(&mut self) {
        let provider = self.provider.take();

        let Some(step) = self.step.take() else {
            return;
        };

        warn!(?step, "checkout step abandoned");

        if let Ok(mut state) = self.state.try_lock() {
            state.abandon(step);
        } else {
            let state = Arc::clone(&self.state);

            spawn_detached(async move {
                state.lock().await.abandon(step);
            });
        }

        if let Some(provider) = provider {
            spawn_detached(async move {
                provider.dismiss().await;
            });
        }
    }
}

fn spawn_detached(task: impl Future<Output = ()> + Send + 'static) {
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            _ = runtime.spawn(task);
        }
        Err(error) => warn!(%error, "no runtime to finish an abandoned checkout step"),
    }
}

/// One in-flight order composition.
#[derive(Debug)]
pub struct CheckoutSession {
    id: Uuid,
    context: CheckoutContext,
    state: Arc<Mutex<SessionState>>,
}

impl CheckoutSession {
    /// Start a session with an empty draft.
    pub fn new(context: CheckoutContext) -> Self {
        Self::with_draft(context, OrderDraft::new())
    }

    /// Start a session from a draft composed elsewhere.
    pub fn with_draft(context: CheckoutContext, draft: OrderDraft) -> Self {
        Self {
            id: Uuid::now_v7(),
            context,
            state: Arc::new(Mutex::new(SessionState {
                draft,
                coupons: CouponLedger::new(),
                method: None,
                phase: CheckoutPhase::Selecting,
                cancel: None,
            })),
        }
    }

    /// Session identifier, used for log correlation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current phase.
    pub async fn phase(&self) -> CheckoutPhase {
        self.state.lock().await.phase.clone()
    }

    /// Snapshot of the draft.
    pub async fn draft(&self) -> OrderDraft {
        self.state.lock().await.draft.clone()
    }

    /// Selected payment method.
    pub async fn payment_method(&self) -> Option<PaymentMethod> {
        self.state.lock().await.method
    }

    /// Code of the applied coupon.
    pub async fn coupon_code(&self) -> Option<String> {
        self.state.lock().await.coupons.code().map(str::to_string)
    }

    /// Replace the service line. Any applied or pending coupon is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InProgress`] during a payment and
    /// [`CheckoutError::SessionClosed`] once the order is placed.
    pub async fn set_service(&self, service: ServiceSelection) -> Result<(), CheckoutError> {
        let mut state = self.editable_state().await?;

        state.draft.set_service(service);
        state.coupons.invalidate();

        Ok(())
    }

    /// Choose where the order is fulfilled.
    ///
    /// # Errors
    ///
    /// See [`CheckoutSession::set_service`].
    pub async fn set_location(&self, location: LocationChoice) -> Result<(), CheckoutError> {
        self.editable_state().await?.draft.set_location(location);

        Ok(())
    }

    /// Forget the location choice.
    ///
    /// # Errors
    ///
    /// See [`CheckoutSession::set_service`].
    pub async fn clear_location(&self) -> Result<(), CheckoutError> {
        self.editable_state().await?.draft.clear_location();

        Ok(())
    }

    /// Set free-text notes.
    ///
    /// # Errors
    ///
    /// See [`CheckoutSession::set_service`].
    pub async fn set_notes(&self, notes: impl Into<String>) -> Result<(), CheckoutError> {
        self.editable_state().await?.draft.set_notes(notes);

        Ok(())
    }

    /// Set the requested visit date/time.
    ///
    /// # Errors
    ///
    /// See [`CheckoutSession::set_service`].
    pub async fn set_schedule(&self, schedule: Schedule) -> Result<(), CheckoutError> {
        self.editable_state().await?.draft.set_schedule(schedule);

        Ok(())
    }

    /// Current totals: server-confirmed when a coupon is applied, estimated otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error when no service is selected or the totals overflow.
    pub async fn totals(&self) -> Result<Totals, CheckoutError> {
        self.state.lock().await.totals(&self.context.settings)
    }

    /// Check a coupon code with the pricing service.
    ///
    /// A check issued later supersedes this one; a superseded result is
    /// discarded and reported as [`CouponCheck::Superseded`].
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Validation`]: the code is blank or no service is selected.
    ///   Nothing is sent.
    /// - [`CheckoutError::Coupon`]: the code was rejected or the check failed. Any
    ///   previously applied coupon is cleared.
    #[tracing::instrument(
        name = "checkout.apply_coupon",
        skip(self, code),
        fields(session = %self.id, sequence = tracing::field::Empty),
        err
    )]
    pub async fn apply_coupon(&self, code: &str) -> Result<CouponCheck, CheckoutError> {
        let (ticket, request) = {
            let mut state = self.editable_state().await?;
            let code = code.trim();

            if code.is_empty() {
                return Err(ValidationError::EmptyCouponCode.into());
            }

            let request = state.draft.coupon_request(code)?;
            let ticket = state.coupons.issue(code)?;

            (ticket, request)
        };

        Span::current().record("sequence", ticket.sequence());

        let mut guard =
            AbandonGuard::new(&self.state, PendingStep::CouponCheck(ticket.sequence()));

        let result = self
            .context
            .pricing
            .check_coupon(&request)
            .await
            .map_err(CouponError::from)
            .and_then(|response| interpret_coupon_response(&response));

        let mut state = self.state.lock().await;

        guard.disarm();

        match state.coupons.resolve(ticket, result) {
            CouponResolution::Applied(result) => {
                info!(final_total = %result.final_total, "coupon applied");

                Ok(CouponCheck::Applied(Totals::from(&result)))
            }
            CouponResolution::Rejected(error) => {
                warn!(%error, "coupon rejected");

                Err(error.into())
            }
            CouponResolution::Superseded => {
                debug!("discarding superseded coupon result");

                Ok(CouponCheck::Superseded)
            }
        }
    }

    /// Remove the applied coupon and discard any pending check.
    ///
    /// # Errors
    ///
    /// See [`CheckoutSession::set_service`].
    pub async fn clear_coupon(&self) -> Result<(), CheckoutError> {
        self.editable_state().await?.coupons.invalidate();

        Ok(())
    }

    /// Choose a payment method. Changing the method is allowed until payment starts.
    ///
    /// # Errors
    ///
    /// See [`CheckoutSession::set_service`].
    pub async fn select_method(&self, method: PaymentMethod) -> Result<(), CheckoutError> {
        let mut state = self.editable_state().await?;

        state.method = Some(method);
        state.phase = CheckoutPhase::Confirming;

        debug!(session = %self.id, %method, "payment method selected");

        Ok(())
    }

    /// Pay with the selected method and place the order.
    ///
    /// Cash is paid on confirmation. Card and wallet payments wait for the payment
    /// provider and can be interrupted with [`CheckoutSession::cancel_payment`].
    /// At most one order creation request is sent per successful payment.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::InProgress`]: a payment, submission or coupon check is
    ///   outstanding. Nothing happens.
    /// - [`CheckoutError::SessionClosed`]: the order was already placed.
    /// - [`CheckoutError::Validation`]: no method is selected or the draft is
    ///   incomplete. Nothing is sent.
    /// - [`CheckoutError::PaymentRequest`]: the charge could not be built.
    /// - [`CheckoutError::Payment`]: the provider reported a failure; the phase is
    ///   [`CheckoutPhase::Failed`].
    /// - [`CheckoutError::Submission`]: the order was not created; the draft is kept.
    #[tracing::instrument(
        name = "checkout.pay_now",
        skip(self),
        fields(session = %self.id, method = tracing::field::Empty),
        err
    )]
    pub async fn pay_now(&self) -> Result<PaymentStatus, CheckoutError> {
        let (method, order, authorization) = {
            let mut state = self.editable_state().await?;

            if state.coupons.is_checking() {
                return Err(CheckoutError::InProgress);
            }

            let method = state.method.ok_or(ValidationError::NoPaymentMethod)?;

            Span::current().record("method", tracing::field::display(method));

            let settings = &self.context.settings;
            let order = OrderRequest::from_draft(
                &state.draft,
                &settings.location_policy,
                state.coupons.code(),
                method,
            )?;
            let totals = state.totals(settings)?;

            match method.completion_mode() {
                CompletionMode::Immediate => {
                    state.phase = CheckoutPhase::Submitting;

                    (method, order, None)
                }
                CompletionMode::AsyncAuthorization => {
                    let request =
                        PaymentRequest::new(&totals.grand_total, &settings.payment_description)?;
                    let (cancel_tx, cancel_rx) = oneshot::channel();

                    state.cancel = Some(cancel_tx);
                    state.phase = CheckoutPhase::Completing;

                    (method, order, Some((request, cancel_rx)))
                }
            }
        };

        let mut guard = AbandonGuard::new(&self.state, PendingStep::Payment);

        let outcome = match authorization {
            None => PaymentOutcome::Paid { payment_id: None },
            Some((request, cancel)) => {
                info!(amount = request.amount(), "awaiting payment provider");

                guard = guard.with_provider(&self.context.payments);

                let outcome = self.authorize(&request, method, cancel).await;

                guard.provider_settled();

                outcome
            }
        };

        let order = {
            let mut state = self.state.lock().await;

            state.cancel = None;

            match outcome {
                PaymentOutcome::Paid { payment_id } => {
                    state.phase = CheckoutPhase::Submitting;

                    order.with_payment_id(payment_id)
                }
                PaymentOutcome::Failed(reason) => {
                    warn!(%reason, "payment failed");

                    state.phase = CheckoutPhase::Failed {
                        reason: reason.clone(),
                    };
                    guard.disarm();

                    return Err(PaymentError::Failed(reason).into());
                }
                PaymentOutcome::Canceled => {
                    info!("payment canceled");

                    state.phase = CheckoutPhase::Confirming;
                    guard.disarm();

                    return Ok(PaymentStatus::Canceled);
                }
            }
        };

        self.submit(&order, &mut guard).await
    }

    /// Interrupt an outstanding card or wallet payment.
    ///
    /// Returns `false` when no payment was waiting on the provider.
    pub async fn cancel_payment(&self) -> bool {
        let sender = self.state.lock().await.cancel.take();

        sender.is_some_and(|sender| sender.send(()).is_ok())
    }

    async fn editable_state(&self) -> Result<MutexGuard<'_, SessionState>, CheckoutError> {
        let state = self.state.lock().await;

        state.ensure_editable()?;

        Ok(state)
    }

    async fn authorize(
        &self,
        request: &PaymentRequest,
        method: PaymentMethod,
        cancel: oneshot::Receiver<()>,
    ) -> PaymentOutcome {
        let payments = &self.context.payments;
        let authorization = tokio::time::timeout(
            self.context.settings.payment_timeout,
            payments.authorize(request, method),
        );

        tokio::select! {
            result = authorization => {
                if let Ok(result) = result {
                    PaymentOutcome::from(result)
                } else {
                    payments.dismiss().await;

                    PaymentOutcome::Failed(TIMEOUT_REASON.to_string())
                }
            }
            _ = cancel => {
                payments.dismiss().await;

                PaymentOutcome::Canceled
            }
        }
    }

    async fn submit(
        &self,
        order: &OrderRequest,
        guard: &mut AbandonGuard,
    ) -> Result<PaymentStatus, CheckoutError> {
        let result = submit_order(self.context.orders.as_ref(), order).await;

        let mut state = self.state.lock().await;

        guard.disarm();

        match result {
            Ok(confirmation) => {
                info!(order_id = %confirmation.order_id, "order placed");

                state.phase = CheckoutPhase::Succeeded {
                    order_id: confirmation.order_id.clone(),
                };
                state.draft = OrderDraft::new();
                state.coupons.invalidate();

                Ok(PaymentStatus::Placed(confirmation))
            }
            Err(error) => {
                warn!(%error, "order submission failed");

                state.phase = CheckoutPhase::Failed {
                    reason: error.to_string(),
                };

                Err(error.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use async_trait::async_trait;
    use rusty_money::{Money, iso::SAR};
    use serde_json::{Value, json};
    use testresult::TestResult;
    use tokio::sync::Notify;

    use crate::{
        api::ApiError,
        coupons::{
            CouponCheckRequest, CouponCheckResponse, CouponTotals, MockPricingService,
            PricingService,
        },
        location::{Coordinate, LiveLocation},
        orders::{MockOrdersService, OrdersService},
        payments::{MockPaymentGateway, ProviderResult, ProviderStatus},
        services::NewServiceSelection,
    };

    use super::*;

    /// Holds every order creation call until released.
    #[derive(Default)]
    struct GatedOrders {
        release: Notify,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OrdersService for GatedOrders {
        async fn create_order(&self, _request: &OrderRequest) -> Result<Value, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;

            Ok(json!({ "status": true, "items": { "id": "order-7" } }))
        }
    }

    /// A pricing service that never answers.
    struct SilentPricing;

    #[async_trait]
    impl PricingService for SilentPricing {
        async fn check_coupon(
            &self,
            _request: &CouponCheckRequest,
        ) -> Result<CouponCheckResponse, ApiError> {
            std::future::pending().await
        }
    }

    /// A provider that never answers.
    #[derive(Default)]
    struct SilentGateway {
        dismissed: AtomicUsize,
    }

    #[async_trait]
    impl PaymentGateway for SilentGateway {
        async fn authorize(
            &self,
            _request: &PaymentRequest,
            _method: PaymentMethod,
        ) -> ProviderResult {
            std::future::pending().await
        }

        async fn dismiss(&self) {
            self.dismissed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn service() -> TestResult<ServiceSelection> {
        Ok(ServiceSelection::try_from(NewServiceSelection {
            category_id: "cat-1".to_string(),
            sub_category_id: "sub-1".to_string(),
            service_id: "svc-1".to_string(),
            category_title: "General services".to_string(),
            sub_category_title: "Cleaning".to_string(),
            unit_price: Money::from_minor(10_000, SAR),
            quantity: 2,
        })?)
    }

    fn draft() -> TestResult<OrderDraft> {
        let mut draft = OrderDraft::new();

        draft.set_service(service()?);
        draft.set_location(LocationChoice::LiveLocation(LiveLocation {
            coordinate: Coordinate::new(24.7, 46.6)?,
            label: None,
        }));

        Ok(draft)
    }

    fn context(
        orders: Arc<dyn OrdersService>,
        payments: Arc<dyn PaymentGateway>,
        settings: CheckoutSettings,
    ) -> CheckoutContext {
        CheckoutContext::new(
            Arc::new(MockPricingService::new()),
            orders,
            payments,
            settings,
        )
    }

    async fn wait_for_dismissal(gateway: &SilentGateway) -> usize {
        for _ in 0..1_000 {
            if gateway.dismissed.load(Ordering::SeqCst) > 0 {
                break;
            }

            tokio::task::yield_now().await;
        }

        gateway.dismissed.load(Ordering::SeqCst)
    }

    async fn wait_for(session: &CheckoutSession, phase: &CheckoutPhase) -> bool {
        for _ in 0..1_000 {
            if session.phase().await == *phase {
                return true;
            }

            tokio::task::yield_now().await;
        }

        false
    }

    #[tokio::test]
    async fn pay_now_requires_a_method() -> TestResult {
        let session = CheckoutSession::with_draft(
            context(
                Arc::new(MockOrdersService::new()),
                Arc::new(MockPaymentGateway::new()),
                CheckoutSettings::default(),
            ),
            draft()?,
        );

        assert_eq!(
            session.pay_now().await,
            Err(CheckoutError::Validation(ValidationError::NoPaymentMethod))
        );
        assert_eq!(session.phase().await, CheckoutPhase::Selecting);

        Ok(())
    }

    #[tokio::test]
    async fn second_pay_now_is_refused_while_submitting() -> TestResult {
        let orders = Arc::new(GatedOrders::default());
        let session = CheckoutSession::with_draft(
            context(
                orders.clone(),
                Arc::new(MockPaymentGateway::new()),
                CheckoutSettings::default(),
            ),
            draft()?,
        );

        session.select_method(PaymentMethod::Cash).await?;

        let (first, second) = tokio::join!(session.pay_now(), async {
            let submitting = wait_for(&session, &CheckoutPhase::Submitting).await;
            let second = session.pay_now().await;

            orders.release.notify_one();

            (submitting, second)
        });

        let (submitting, second) = second;

        assert!(submitting);
        assert_eq!(second, Err(CheckoutError::InProgress));
        assert!(matches!(first?, PaymentStatus::Placed(confirmation) if confirmation.order_id == "order-7"));
        assert_eq!(orders.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            session.phase().await,
            CheckoutPhase::Succeeded {
                order_id: "order-7".to_string()
            }
        );
        assert_eq!(
            session.pay_now().await,
            Err(CheckoutError::SessionClosed)
        );

        Ok(())
    }

    #[tokio::test]
    async fn canceling_returns_to_confirming() -> TestResult {
        for method in [PaymentMethod::Card, PaymentMethod::WalletPay] {
            let gateway = Arc::new(SilentGateway::default());
            let session = CheckoutSession::with_draft(
                context(
                    Arc::new(MockOrdersService::new()),
                    gateway.clone(),
                    CheckoutSettings::default(),
                ),
                draft()?,
            );

            session.select_method(method).await?;

            assert!(!session.cancel_payment().await);

            let (status, (completing, second, canceled)) = tokio::join!(session.pay_now(), async {
                let completing = wait_for(&session, &CheckoutPhase::Completing).await;
                let second = session.pay_now().await;
                let canceled = session.cancel_payment().await;

                (completing, second, canceled)
            });

            assert!(completing, "{method} never reached the provider");
            assert_eq!(second, Err(CheckoutError::InProgress));
            assert!(canceled);
            assert_eq!(status, Ok(PaymentStatus::Canceled));
            assert_eq!(session.phase().await, CheckoutPhase::Confirming);
            assert_eq!(gateway.dismissed.load(Ordering::SeqCst), 1);
        }

        Ok(())
    }

    #[tokio::test]
    async fn silent_provider_times_out() -> TestResult {
        let gateway = Arc::new(SilentGateway::default());
        let settings = CheckoutSettings {
            payment_timeout: Duration::from_millis(20),
            ..CheckoutSettings::default()
        };
        let session = CheckoutSession::with_draft(
            context(Arc::new(MockOrdersService::new()), gateway.clone(), settings),
            draft()?,
        );

        session.select_method(PaymentMethod::WalletPay).await?;

        assert_eq!(
            session.pay_now().await,
            Err(CheckoutError::Payment(PaymentError::Failed(
                TIMEOUT_REASON.to_string()
            )))
        );
        assert_eq!(
            session.phase().await,
            CheckoutPhase::Failed {
                reason: TIMEOUT_REASON.to_string()
            }
        );
        assert_eq!(gateway.dismissed.load(Ordering::SeqCst), 1);

        Ok(())
    }

    #[tokio::test]
    async fn online_payment_id_is_submitted() -> TestResult {
        let mut payments = MockPaymentGateway::new();
        let mut orders = MockOrdersService::new();

        payments
            .expect_authorize()
            .once()
            .withf(|request, method| request.amount() == 23_000 && *method == PaymentMethod::Card)
            .return_once(|_, _| ProviderResult {
                status: ProviderStatus::Paid,
                id: Some("pay-9".to_string()),
                message: None,
            });

        orders
            .expect_create_order()
            .once()
            .withf(|request| {
                request.payment_type == 2 && request.payment_id.as_deref() == Some("pay-9")
            })
            .return_once(|_| Ok(json!({ "status": true, "items": { "_id": "order-9" } })));

        let session = CheckoutSession::with_draft(
            context(Arc::new(orders), Arc::new(payments), CheckoutSettings::default()),
            draft()?,
        );

        session.select_method(PaymentMethod::Card).await?;

        assert!(matches!(
            session.pay_now().await?,
            PaymentStatus::Placed(confirmation) if confirmation.order_id == "order-9"
        ));
        assert!(session.draft().await.service().is_none());

        Ok(())
    }

    #[tokio::test]
    async fn changing_the_service_drops_the_coupon() -> TestResult {
        let mut pricing = MockPricingService::new();

        pricing.expect_check_coupon().once().return_once(|_| {
            Ok(CouponCheckResponse {
                status: Some(true),
                message: None,
                items: Some(CouponTotals {
                    total_before_tax: 200.0,
                    discount: 20.0,
                    total_tax: 27.0,
                    final_total: 207.0,
                }),
            })
        });

        let session = CheckoutSession::with_draft(
            CheckoutContext::new(
                Arc::new(pricing),
                Arc::new(MockOrdersService::new()),
                Arc::new(MockPaymentGateway::new()),
                CheckoutSettings::default(),
            ),
            draft()?,
        );

        let check = session.apply_coupon(" SAVE10 ").await?;

        assert!(matches!(check, CouponCheck::Applied(totals) if totals.grand_total.to_minor_units() == 20_700));
        assert_eq!(session.coupon_code().await.as_deref(), Some("SAVE10"));

        session.set_service(service()?).await?;

        assert_eq!(session.coupon_code().await, None);
        assert_eq!(session.totals().await?.grand_total.to_minor_units(), 23_000);

        Ok(())
    }

    #[tokio::test]
    async fn abandoned_payment_dismisses_the_provider() -> TestResult {
        let gateway = Arc::new(SilentGateway::default());
        let session = CheckoutSession::with_draft(
            context(
                Arc::new(MockOrdersService::new()),
                gateway.clone(),
                CheckoutSettings::default(),
            ),
            draft()?,
        );

        session.select_method(PaymentMethod::Card).await?;

        let abandoned = tokio::time::timeout(Duration::from_millis(20), session.pay_now()).await;

        assert!(abandoned.is_err());
        assert_eq!(session.phase().await, CheckoutPhase::Confirming);
        assert_eq!(wait_for_dismissal(&gateway).await, 1);
        assert!(!session.cancel_payment().await);
        assert_eq!(session.select_method(PaymentMethod::Cash).await, Ok(()));

        Ok(())
    }

    #[tokio::test]
    async fn abandoned_submission_fails_the_attempt() -> TestResult {
        let orders = Arc::new(GatedOrders::default());
        let session = CheckoutSession::with_draft(
            context(
                orders.clone(),
                Arc::new(MockPaymentGateway::new()),
                CheckoutSettings::default(),
            ),
            draft()?,
        );

        session.select_method(PaymentMethod::Cash).await?;

        let abandoned = tokio::time::timeout(Duration::from_millis(20), session.pay_now()).await;

        assert!(abandoned.is_err());
        assert_eq!(orders.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            session.phase().await,
            CheckoutPhase::Failed {
                reason: SUBMISSION_INTERRUPTED.to_string()
            }
        );
        assert!(session.draft().await.service().is_some());

        Ok(())
    }

    #[tokio::test]
    async fn abandoned_coupon_check_does_not_block_payment() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_create_order()
            .once()
            .withf(|request| request.coupon_code.is_empty())
            .return_once(|_| Ok(json!({ "status": true, "items": { "id": "order-8" } })));

        let session = CheckoutSession::with_draft(
            CheckoutContext::new(
                Arc::new(SilentPricing),
                Arc::new(orders),
                Arc::new(MockPaymentGateway::new()),
                CheckoutSettings::default(),
            ),
            draft()?,
        );

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), session.apply_coupon("SAVE10")).await;

        assert!(abandoned.is_err());

        session.select_method(PaymentMethod::Cash).await?;

        assert!(matches!(
            session.pay_now().await?,
            PaymentStatus::Placed(confirmation) if confirmation.order_id == "order-8"
        ));

        Ok(())
    }
}

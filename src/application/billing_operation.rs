/// 課金オペレーション
///
/// リクエストボディの`storage`（保存したいノート数）と`source`（カードトークン）
/// から請求額を計算し、決済ゲートウェイで課金する。
use async_trait::async_trait;
use tracing::info;

use crate::application::BusinessOperation;
use crate::domain::{ApiEvent, BillingRequest, BillingResult, Charge, HandlerError, InvocationContext};
use crate::infrastructure::PaymentGateway;

pub struct BillingOperation<P>
where
    P: PaymentGateway,
{
    gateway: P,
}

impl<P> BillingOperation<P>
where
    P: PaymentGateway,
{
    pub fn new(gateway: P) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl<P> BusinessOperation for BillingOperation<P>
where
    P: PaymentGateway,
{
    type Output = BillingResult;

    async fn execute(
        &self,
        event: &ApiEvent,
        context: &InvocationContext,
    ) -> Result<BillingResult, HandlerError> {
        let request: BillingRequest = event.parse_body()?;
        request.validate()?;

        let charge = Charge::for_request(&request);

        context.debug(format!(
            "PaymentGateway.charge storage={} amount={} currency={}",
            request.storage, charge.amount, charge.currency
        ));
        let confirmation = self.gateway.charge(&charge).await?;

        info!(
            request_id = context.request_id(),
            charge_id = %confirmation.id,
            amount = charge.amount,
            "課金処理完了"
        );

        Ok(BillingResult::charged())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::RequestHandler;
    use crate::infrastructure::payment_gateway::tests::MockPaymentGateway;
    use crate::infrastructure::tracer::tests::MockTracer;
    use crate::infrastructure::PaymentError;

    fn create_test_operation() -> (BillingOperation<MockPaymentGateway>, MockPaymentGateway) {
        let gateway = MockPaymentGateway::new();
        (BillingOperation::new(gateway.clone()), gateway)
    }

    fn context() -> InvocationContext {
        InvocationContext::new("req-1", "arn:aws:lambda:us-east-1:123456789012:function:billing", 0)
    }

    fn billing_event(storage: u64) -> ApiEvent {
        ApiEvent::with_body(format!(r#"{{"storage":{},"source":"tok_visa"}}"#, storage))
    }

    #[tokio::test]
    async fn test_charges_calculated_amount() {
        let (operation, gateway) = create_test_operation();

        let result = operation.execute(&billing_event(21), &context()).await.unwrap();

        assert_eq!(result, BillingResult::charged());
        let charges = gateway.charges();
        assert_eq!(charges.len(), 1);
        assert_eq!(charges[0].amount, 4200);
        assert_eq!(charges[0].source, "tok_visa");
        assert_eq!(charges[0].description, "Scratch charge");
        assert_eq!(charges[0].currency, "usd");
    }

    #[tokio::test]
    async fn test_tiers_flow_into_charge() {
        let (operation, gateway) = create_test_operation();

        for storage in [5, 50, 500] {
            operation.execute(&billing_event(storage), &context()).await.unwrap();
        }

        let amounts: Vec<u64> = gateway.charges().iter().map(|c| c.amount).collect();
        assert_eq!(amounts, vec![2000, 10000, 50000]);
    }

    #[tokio::test]
    async fn test_zero_storage_is_rejected_before_charge() {
        let (operation, gateway) = create_test_operation();

        let result = operation.execute(&billing_event(0), &context()).await;

        assert!(matches!(result, Err(HandlerError::InvalidBody(_))));
        assert!(gateway.charges().is_empty());
    }

    #[tokio::test]
    async fn test_missing_source_is_invalid_body() {
        let (operation, gateway) = create_test_operation();
        let event = ApiEvent::with_body(r#"{"storage":5}"#);

        let result = operation.execute(&event, &context()).await;

        assert!(matches!(result, Err(HandlerError::InvalidBody(_))));
        assert!(gateway.charges().is_empty());
    }

    #[tokio::test]
    async fn test_negative_storage_is_invalid_body() {
        let (operation, _) = create_test_operation();
        let event = ApiEvent::with_body(r#"{"storage":-1,"source":"tok_visa"}"#);

        let result = operation.execute(&event, &context()).await;

        assert!(matches!(result, Err(HandlerError::InvalidBody(_))));
    }

    #[tokio::test]
    async fn test_gateway_error() {
        let (operation, gateway) = create_test_operation();
        gateway.set_next_error(PaymentError::Declined("Your card was declined.".to_string()));

        let result = operation.execute(&billing_event(5), &context()).await;

        assert_eq!(
            result.unwrap_err(),
            HandlerError::Payment("Charge declined: Your card was declined.".to_string())
        );
    }

    #[tokio::test]
    async fn test_through_request_handler() {
        let (operation, _) = create_test_operation();
        let mut tracer = MockTracer::new();

        let response = RequestHandler::new()
            .handle(&mut tracer, &operation, &billing_event(5), &context())
            .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, r#"{"status":true}"#);
    }

    #[tokio::test]
    async fn test_declined_through_request_handler() {
        let (operation, gateway) = create_test_operation();
        gateway.set_next_error(PaymentError::Declined("Your card was declined.".to_string()));
        let mut tracer = MockTracer::new();

        let response = RequestHandler::new()
            .handle(&mut tracer, &operation, &billing_event(5), &context())
            .await;

        assert_eq!(response.status_code, 500);
        assert_eq!(
            response.body,
            r#"{"error":"Payment error: Charge declined: Your card was declined."}"#
        );
        assert_eq!(tracer.count("flush"), 1);
    }
}

use axum::extract::State;
use axum::Json;

use crate::app_state::AppState;
use crate::auth::CustomerAuth;
use crate::db;
use crate::error::ApiError;
use crate::models::booking::{
    PaymentMethod, PaymentOrderRequest, PaymentOrderResponse, PaymentStatus, VerifyPaymentRequest,
};
use crate::models::MessageResponse;
use crate::services::notifications::NotificationEvent;

use super::notify;

/// POST /api/payments/create-order
///
/// Cash on delivery confirms the booking immediately. Every other method gets
/// a gateway order; a booking that already has one reuses it.
pub async fn create_order(
    State(state): State<AppState>,
    CustomerAuth(user_id): CustomerAuth,
    Json(body): Json<PaymentOrderRequest>,
) -> Result<Json<PaymentOrderResponse>, ApiError> {
    let booking = db::bookings::get_for_customer(&state.db, body.booking_id, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking"))?;

    if !booking.payment_method.requires_gateway() {
        db::bookings::record_payment(&state.db, booking.id, user_id, PaymentStatus::Pending, true)
            .await?;
        tracing::info!(booking_id = %booking.id, "COD booking confirmed");
        notify(
            &state,
            user_id,
            booking.id,
            NotificationEvent::BookingConfirmed {
                booking_id: booking.id,
            },
        )
        .await;

        return Ok(Json(PaymentOrderResponse::Cod {
            payment_method: PaymentMethod::Cod,
            message: "Booking confirmed".to_string(),
        }));
    }

    if let Some(order_id) = booking.razorpay_order_id {
        return Ok(Json(PaymentOrderResponse::Gateway {
            order_id,
            amount: booking.amount,
            currency: "INR".to_string(),
            key_id: state.payments.key_id().to_string(),
        }));
    }

    let order = match state
        .payments
        .create_order(booking.amount, &booking.id.to_string())
        .await
    {
        Ok(order) => order,
        Err(e) => {
            db::bookings::record_payment(&state.db, booking.id, user_id, PaymentStatus::Failed, false)
                .await?;
            metrics::counter!("payments_failed_total", "stage" => "create_order").increment(1);
            return Err(e.into());
        }
    };

    db::bookings::set_payment_order(&state.db, booking.id, &order.id).await?;
    tracing::info!(booking_id = %booking.id, order_id = %order.id, "Gateway order created");

    Ok(Json(PaymentOrderResponse::Gateway {
        order_id: order.id,
        amount: order.amount,
        currency: order.currency,
        key_id: state.payments.key_id().to_string(),
    }))
}

/// POST /api/payments/verify — check the checkout signature against the
/// booking's own gateway order.
pub async fn verify_payment(
    State(state): State<AppState>,
    CustomerAuth(user_id): CustomerAuth,
    Json(body): Json<VerifyPaymentRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let booking = db::bookings::get_for_customer(&state.db, body.booking_id, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking"))?;

    if booking.razorpay_order_id.as_deref() != Some(body.razorpay_order_id.as_str()) {
        metrics::counter!("payments_failed_total", "stage" => "order_mismatch").increment(1);
        tracing::warn!(
            booking_id = %booking.id,
            order_id = %body.razorpay_order_id,
            "Payment order does not belong to booking"
        );
        return Err(ApiError::BadRequest(
            "Payment order does not match this booking".to_string(),
        ));
    }

    let valid = state.payments.verify_signature(
        &body.razorpay_order_id,
        &body.razorpay_payment_id,
        &body.razorpay_signature,
    );

    if !valid {
        db::bookings::record_payment(&state.db, booking.id, user_id, PaymentStatus::Failed, false)
            .await?;
        metrics::counter!("payments_failed_total", "stage" => "verify").increment(1);
        tracing::warn!(booking_id = %booking.id, "Payment signature mismatch");
        return Err(ApiError::BadRequest("Payment verification failed".to_string()));
    }

    db::bookings::record_payment(&state.db, booking.id, user_id, PaymentStatus::Completed, true)
        .await?;
    metrics::counter!("payments_verified_total").increment(1);
    tracing::info!(
        booking_id = %booking.id,
        payment_id = %body.razorpay_payment_id,
        "Payment verified"
    );
    notify(
        &state,
        user_id,
        booking.id,
        NotificationEvent::PaymentSuccess {
            amount: booking.amount,
        },
    )
    .await;

    Ok(Json(MessageResponse::new("Payment verified successfully")))
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::money::Money;

/// Events customers are told about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationEvent {
    BookingConfirmed { booking_id: Uuid },
    TeamEnRoute { eta_minutes: u32 },
    ServiceStarted,
    ServiceCompleted,
    PaymentSuccess { amount: Money },
    Reminder { date: String },
}

/// A rendered push notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub tag: String,
    pub require_interaction: bool,
}

impl NotificationEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BookingConfirmed { .. } => "booking_confirmed",
            Self::TeamEnRoute { .. } => "team_en_route",
            Self::ServiceStarted => "service_started",
            Self::ServiceCompleted => "service_completed",
            Self::PaymentSuccess { .. } => "payment_success",
            Self::Reminder { .. } => "reminder",
        }
    }

    pub fn render(&self) -> Notification {
        let (title, body, tag, require_interaction) = match self {
            Self::BookingConfirmed { booking_id } => (
                "Booking Confirmed! 🎉".to_string(),
                format!(
                    "Your booking #{} has been confirmed. We'll notify you when the team is on the way.",
                    short_id(booking_id)
                ),
                format!("booking-{booking_id}"),
                false,
            ),
            Self::TeamEnRoute { eta_minutes } => (
                "Team On The Way! 🚗".to_string(),
                format!(
                    "Our cleaning team is on the way to your location. ETA: {eta_minutes} minutes."
                ),
                "team-enroute".to_string(),
                true,
            ),
            Self::ServiceStarted => (
                "Service Started ⚡".to_string(),
                "Our team has started the cleaning service at your location.".to_string(),
                "service-started".to_string(),
                false,
            ),
            Self::ServiceCompleted => (
                "Service Completed ✅".to_string(),
                "Your tank/sump cleaning is complete! Check the before & after photos in your dashboard."
                    .to_string(),
                "service-completed".to_string(),
                true,
            ),
            Self::PaymentSuccess { amount } => (
                "Payment Successful 💰".to_string(),
                format!("Payment of {amount} received successfully. Thank you!"),
                "payment-success".to_string(),
                false,
            ),
            Self::Reminder { date } => (
                "Upcoming Service Reminder 📅".to_string(),
                format!("You have a cleaning service scheduled for {date}. See you soon!"),
                "reminder".to_string(),
                false,
            ),
        };

        Notification {
            title,
            body,
            tag,
            require_interaction,
        }
    }
}

fn short_id(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_amount_is_shown_in_rupees() {
        let n = NotificationEvent::PaymentSuccess {
            amount: Money::from_paise(200_000),
        }
        .render();
        assert_eq!(n.body, "Payment of ₹2000 received successfully. Thank you!");
        assert_eq!(n.tag, "payment-success");
    }

    #[test]
    fn en_route_requires_interaction() {
        let n = NotificationEvent::TeamEnRoute { eta_minutes: 15 }.render();
        assert!(n.require_interaction);
        assert!(n.body.ends_with("ETA: 15 minutes."));
    }

    #[test]
    fn booking_confirmation_is_tagged_by_booking() {
        let id = Uuid::new_v4();
        let n = NotificationEvent::BookingConfirmed { booking_id: id }.render();
        assert_eq!(n.tag, format!("booking-{id}"));
        assert!(n.body.contains(&short_id(&id)));
    }

    #[test]
    fn events_are_tagged_by_type_on_the_wire() {
        let json = serde_json::to_value(NotificationEvent::ServiceStarted).unwrap();
        assert_eq!(json["type"], "service_started");
        assert_eq!(NotificationEvent::ServiceCompleted.kind(), "service_completed");
    }
}

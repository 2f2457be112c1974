//! Case-insensitive list filtering shared by the admin API and the client.

use serde::{Deserialize, Serialize};

use crate::models::booking::{AdminBookingView, BookingStatus};
use crate::models::user::{Customer, FieldTechnician};

/// Something that can be matched by free-text search.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

impl Searchable for AdminBookingView {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = Vec::with_capacity(3);
        if let Some(c) = &self.customer {
            fields.push(c.name.as_str());
            fields.push(c.email.as_str());
        }
        fields
    }
}

impl Searchable for Customer {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str()]
    }
}

impl Searchable for FieldTechnician {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.email.as_str(),
            self.employee_id.as_str(),
        ]
    }
}

pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// True when the term is blank or any searchable field contains it.
pub fn matches<T: Searchable>(item: &T, term: &str) -> bool {
    let term = term.trim();
    term.is_empty() || item.search_fields().into_iter().any(|f| contains_ci(f, term))
}

pub fn filter<'a, T: Searchable>(items: &'a [T], term: &str) -> Vec<&'a T> {
    items.iter().filter(|i| matches(*i, term)).collect()
}

/// Admin booking list filters, also accepted as query parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingFilter {
    #[serde(default)]
    pub status: Option<BookingStatus>,
    #[serde(default)]
    pub search: Option<String>,
}

impl BookingFilter {
    pub fn matches(&self, view: &AdminBookingView) -> bool {
        if self.status.is_some_and(|s| s != view.booking.status) {
            return false;
        }
        match self.search.as_deref() {
            None => true,
            Some(term) => {
                let term = term.trim();
                term.is_empty()
                    || contains_ci(&view.booking.id.to_string(), term)
                    || matches(view, term)
            }
        }
    }

    pub fn apply(&self, views: Vec<AdminBookingView>) -> Vec<AdminBookingView> {
        views.into_iter().filter(|v| self.matches(v)).collect()
    }
}

/// Query string for the admin user lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Option<String>,
}

impl SearchQuery {
    pub fn term(&self) -> &str {
        self.search.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::{
        Booking, PackageType, PaymentMethod, PaymentStatus, TankType,
    };
    use crate::models::money::Money;
    use crate::models::user::CustomerSummary;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn view(name: &str, email: &str, status: BookingStatus) -> AdminBookingView {
        let now = Utc::now();
        AdminBookingView {
            booking: Booking {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                address_id: Uuid::new_v4(),
                tank_type: TankType::Underground,
                tank_capacity: "5000L".into(),
                tank_photo_url: None,
                service_date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
                service_time: "14:00".into(),
                package_type: PackageType::Automated,
                add_disinfection: false,
                add_maintenance: false,
                add_repair: false,
                payment_method: PaymentMethod::Upi,
                status,
                payment_status: PaymentStatus::Completed,
                amount: Money::from_rupees(2500),
                razorpay_order_id: None,
                assigned_technician_id: None,
                checklist: None,
                incident_reports: Vec::new(),
                before_photos: Vec::new(),
                after_photos: Vec::new(),
                customer_signature: None,
                completion_notes: None,
                started_at: None,
                completed_at: None,
                created_at: now,
                updated_at: now,
            },
            customer: Some(CustomerSummary {
                id: Uuid::new_v4(),
                name: name.into(),
                email: email.into(),
                phone: "9000000000".into(),
            }),
            address: None,
            technician: None,
        }
    }

    fn sample() -> Vec<AdminBookingView> {
        vec![
            view("Asha Rao", "asha@example.in", BookingStatus::Pending),
            view("Vikram Shah", "vikram@corp.in", BookingStatus::Confirmed),
            view("Meena Iyer", "meena@example.in", BookingStatus::Completed),
        ]
    }

    #[test]
    fn email_substring_unique_to_one_customer() {
        let filter = BookingFilter {
            status: None,
            search: Some("CORP".into()),
        };
        let hits = filter.apply(sample());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].customer.as_ref().unwrap().name, "Vikram Shah");
    }

    #[test]
    fn blank_search_keeps_everything() {
        let filter = BookingFilter {
            status: None,
            search: Some("  ".into()),
        };
        assert_eq!(filter.apply(sample()).len(), 3);
        assert_eq!(BookingFilter::default().apply(sample()).len(), 3);
    }

    #[test]
    fn status_and_search_combine() {
        let filter = BookingFilter {
            status: Some(BookingStatus::Completed),
            search: Some("example".into()),
        };
        let hits = filter.apply(sample());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].booking.status, BookingStatus::Completed);
    }

    #[test]
    fn booking_id_is_searchable() {
        let views = sample();
        let prefix = views[2].booking.id.to_string()[..8].to_uppercase();
        let filter = BookingFilter {
            status: None,
            search: Some(prefix),
        };
        assert_eq!(filter.apply(views).len(), 1);
    }

    #[test]
    fn containment_ignores_case() {
        assert!(contains_ci("Field Team Alpha", "team al"));
        assert!(!contains_ci("alpha", "beta"));
    }
}

//! Five-step booking flow: address, tank, schedule, package, payment.
//!
//! Each step checks only its own fields before the wizard advances. The
//! total shown to the customer uses the same pricing the server applies.

use chrono::NaiveDate;
use uuid::Uuid;

use super::{ApiClient, ClientError};
use crate::models::booking::{
    AddOns, Booking, BookingCreate, PackageType, PaymentMethod, PaymentOrderResponse, TankType,
};
use crate::models::money::Money;
use crate::services::pricing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, strum::Display)]
pub enum WizardStep {
    Address,
    TankDetails,
    Schedule,
    Package,
    Payment,
}

impl WizardStep {
    fn next(self) -> Option<Self> {
        match self {
            Self::Address => Some(Self::TankDetails),
            Self::TankDetails => Some(Self::Schedule),
            Self::Schedule => Some(Self::Package),
            Self::Package => Some(Self::Payment),
            Self::Payment => None,
        }
    }

    fn previous(self) -> Option<Self> {
        match self {
            Self::Address => None,
            Self::TankDetails => Some(Self::Address),
            Self::Schedule => Some(Self::TankDetails),
            Self::Package => Some(Self::Schedule),
            Self::Payment => Some(Self::Package),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("Please select or add an address")]
    MissingAddress,

    #[error("Please enter the tank capacity")]
    MissingCapacity,

    #[error("Please select a service date")]
    MissingDate,

    #[error("Please select a time slot")]
    MissingTime,

    #[error("Already at the last step")]
    AtLastStep,
}

/// Where the booking ended up after submission.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    /// Cash on delivery: the booking is confirmed, nothing to collect.
    Confirmed(Booking),
    /// The customer still has to pay the gateway order.
    AwaitingPayment {
        booking: Booking,
        order_id: String,
        amount: Money,
        key_id: String,
    },
}

#[derive(Debug, Clone)]
pub struct BookingWizard {
    step: WizardStep,
    pub address_id: Option<Uuid>,
    pub tank_type: TankType,
    pub tank_capacity: String,
    pub tank_photo_url: Option<String>,
    pub service_date: Option<NaiveDate>,
    pub service_time: String,
    pub package_type: PackageType,
    pub add_ons: AddOns,
    pub payment_method: PaymentMethod,
}

impl Default for BookingWizard {
    fn default() -> Self {
        Self {
            step: WizardStep::Address,
            address_id: None,
            tank_type: TankType::Overhead,
            tank_capacity: "1000".to_string(),
            tank_photo_url: None,
            service_date: None,
            service_time: "09:00".to_string(),
            package_type: PackageType::Manual,
            add_ons: AddOns::default(),
            payment_method: PaymentMethod::Upi,
        }
    }
}

impl BookingWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    fn check(&self, step: WizardStep) -> Result<(), WizardError> {
        match step {
            WizardStep::Address if self.address_id.is_none() => Err(WizardError::MissingAddress),
            WizardStep::TankDetails if self.tank_capacity.trim().is_empty() => {
                Err(WizardError::MissingCapacity)
            }
            WizardStep::Schedule if self.service_date.is_none() => Err(WizardError::MissingDate),
            WizardStep::Schedule if self.service_time.trim().is_empty() => {
                Err(WizardError::MissingTime)
            }
            _ => Ok(()),
        }
    }

    /// Validate the current step and move forward.
    pub fn next(&mut self) -> Result<WizardStep, WizardError> {
        self.check(self.step)?;
        self.step = self.step.next().ok_or(WizardError::AtLastStep)?;
        Ok(self.step)
    }

    /// Step back without validating. Stays put on the first step.
    pub fn back(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    pub fn total(&self) -> Money {
        pricing::quote(self.package_type, &self.add_ons)
    }

    /// The booking request, once every step is valid.
    pub fn to_request(&self) -> Result<BookingCreate, WizardError> {
        for step in [
            WizardStep::Address,
            WizardStep::TankDetails,
            WizardStep::Schedule,
        ] {
            self.check(step)?;
        }
        let (Some(address_id), Some(service_date)) = (self.address_id, self.service_date) else {
            return Err(WizardError::MissingAddress);
        };

        Ok(BookingCreate {
            address_id,
            tank_type: self.tank_type,
            tank_capacity: self.tank_capacity.trim().to_string(),
            tank_photo_url: self.tank_photo_url.clone(),
            service_date,
            service_time: self.service_time.trim().to_string(),
            package_type: self.package_type,
            add_disinfection: self.add_ons.disinfection,
            add_maintenance: self.add_ons.maintenance,
            add_repair: self.add_ons.repair,
            payment_method: self.payment_method,
        })
    }

    /// Create the booking and start payment.
    ///
    /// Nothing is sent when a step is invalid.
    pub async fn submit(&self, client: &ApiClient) -> Result<BookingOutcome, ClientError> {
        let request = self.to_request()?;
        let booking = client.create_booking(&request).await?;

        match client.create_payment_order(booking.id).await? {
            PaymentOrderResponse::Cod { .. } => {
                let booking = client.booking(booking.id).await?;
                Ok(BookingOutcome::Confirmed(booking))
            }
            PaymentOrderResponse::Gateway {
                order_id,
                amount,
                key_id,
                ..
            } => Ok(BookingOutcome::AwaitingPayment {
                booking,
                order_id,
                amount,
                key_id,
            }),
        }
    }
}

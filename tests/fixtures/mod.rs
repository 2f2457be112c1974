//! Booking fixtures shared by the API, client and integration tests.
#![allow(dead_code)]

use aquaclean::models::booking::PackageType;

/// A package/add-on selection and the price it must come to.
#[derive(Debug, Clone)]
pub struct BookingFixture {
    pub package: PackageType,
    pub disinfection: bool,
    pub maintenance: bool,
    pub repair: bool,
    pub expected_rupees: i64,
    pub description: &'static str,
}

pub const BOOKING_FIXTURES: &[BookingFixture] = &[
    BookingFixture {
        package: PackageType::Manual,
        disinfection: false,
        maintenance: false,
        repair: false,
        expected_rupees: 1500,
        description: "Manual clean only",
    },
    BookingFixture {
        package: PackageType::Manual,
        disinfection: true,
        maintenance: false,
        repair: false,
        expected_rupees: 2000,
        description: "Manual clean with disinfection",
    },
    BookingFixture {
        package: PackageType::Automated,
        disinfection: false,
        maintenance: true,
        repair: false,
        expected_rupees: 3250,
        description: "Automated clean with maintenance",
    },
    BookingFixture {
        package: PackageType::Automated,
        disinfection: true,
        maintenance: true,
        repair: true,
        expected_rupees: 4750,
        description: "Automated clean with every add-on",
    },
];

pub const TECHNICIAN_PASSWORD: &str = "field-pass-1";
pub const CUSTOMER_PASSWORD: &str = "customer-pass-1";

/// Evidence URLs accepted by job completion.
pub const BEFORE_PHOTOS: &str = "https://cdn.example.in/before-1.jpg, https://cdn.example.in/before-2.jpg";
pub const AFTER_PHOTOS: &str = "https://cdn.example.in/after-1.jpg";
pub const SIGNATURE: &str = "data:image/png;base64,iVBORw0KGgo=";

use crate::models::booking::{AddOns, PackageType};
use crate::models::money::Money;

const MANUAL_BASE: Money = Money::from_rupees(1500);
const AUTOMATED_BASE: Money = Money::from_rupees(2500);

const DISINFECTION: Money = Money::from_rupees(500);
const MAINTENANCE: Money = Money::from_rupees(750);
const REPAIR: Money = Money::from_rupees(1000);

pub fn base_price(package: PackageType) -> Money {
    match package {
        PackageType::Manual => MANUAL_BASE,
        PackageType::Automated => AUTOMATED_BASE,
    }
}

/// Prices of the selected add-ons, in a fixed order.
pub fn add_on_prices(add_ons: &AddOns) -> Vec<(&'static str, Money)> {
    [
        ("disinfection", add_ons.disinfection, DISINFECTION),
        ("maintenance", add_ons.maintenance, MAINTENANCE),
        ("repair", add_ons.repair, REPAIR),
    ]
    .into_iter()
    .filter(|(_, selected, _)| *selected)
    .map(|(name, _, price)| (name, price))
    .collect()
}

/// Booking total: package base plus every selected add-on.
///
/// The server stores this value; clients may show it before submitting but
/// never send it.
pub fn quote(package: PackageType, add_ons: &AddOns) -> Money {
    base_price(package)
        + add_on_prices(add_ons)
            .into_iter()
            .map(|(_, price)| price)
            .sum::<Money>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_add_on_combinations() -> Vec<AddOns> {
        (0..8u8)
            .map(|bits| AddOns {
                disinfection: bits & 1 != 0,
                maintenance: bits & 2 != 0,
                repair: bits & 4 != 0,
            })
            .collect()
    }

    #[test]
    fn manual_with_disinfection_is_two_thousand() {
        let add_ons = AddOns {
            disinfection: true,
            ..AddOns::default()
        };
        assert_eq!(quote(PackageType::Manual, &add_ons), Money::from_rupees(2000));
    }

    #[test]
    fn automated_with_everything() {
        let add_ons = AddOns {
            disinfection: true,
            maintenance: true,
            repair: true,
        };
        assert_eq!(
            quote(PackageType::Automated, &add_ons),
            Money::from_rupees(2500 + 500 + 750 + 1000)
        );
    }

    #[test]
    fn total_is_base_plus_selected_add_ons() {
        for package in [PackageType::Manual, PackageType::Automated] {
            for add_ons in all_add_on_combinations() {
                let mut expected = base_price(package).paise();
                if add_ons.disinfection {
                    expected += 50_000;
                }
                if add_ons.maintenance {
                    expected += 75_000;
                }
                if add_ons.repair {
                    expected += 100_000;
                }
                assert_eq!(quote(package, &add_ons).paise(), expected, "{add_ons:?}");
            }
        }
    }

    #[test]
    fn no_add_ons_is_base_price() {
        assert_eq!(
            quote(PackageType::Manual, &AddOns::default()),
            Money::from_paise(150_000)
        );
    }
}

//! Synthetic driver details for the violation detail view.
//!
//! These are placeholder names derived from the car id purely for
//! presentation. They are not an identity lookup and must never be treated
//! as one.

const FIRST_NAMES: [&str; 10] = [
    "Nafe", "Abood", "Ody", "Dana", "Mohammad", "Basel", "Mahmoud", "Alaa", "Sadeel", "Kareem",
];
const LAST_NAMES: [&str; 10] = [
    "Abubaker", "Abed", "Shbayeh", "Sbaih", "Fares", "Khater", "Shahwan", "Ajouly", "Rimawi",
    "Taweel",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub first: &'static str,
    pub last: &'static str,
    pub phone: String,
}

/// Deterministic placeholder person for `car_id`.
pub fn person_for(car_id: &str) -> Person {
    let n = leading_integer(car_id);
    Person {
        first: FIRST_NAMES[(n % FIRST_NAMES.len() as u64) as usize],
        last: LAST_NAMES[(n % LAST_NAMES.len() as u64) as usize],
        phone: format!("555-01{:0>2}", car_id),
    }
}

/// Base-10 value of the leading digits, zero when there are none.
fn leading_integer(text: &str) -> u64 {
    text.trim_start()
        .chars()
        .map_while(|c| c.to_digit(10))
        .fold(0u64, |acc, digit| {
            acc.wrapping_mul(10).wrapping_add(digit as u64)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_cycle_over_the_lists() {
        let person = person_for("12");
        assert_eq!(person.first, "Ody");
        assert_eq!(person.last, "Shbayeh");
        assert_eq!(person.phone, "555-0112");
    }

    #[test]
    fn short_ids_are_zero_padded_and_non_numeric_ids_fall_back() {
        assert_eq!(person_for("7").phone, "555-0107");
        let person = person_for("abc");
        assert_eq!(person.first, "Nafe");
        assert_eq!(person.last, "Abubaker");
        assert_eq!(person.phone, "555-01abc");
    }

    #[test]
    fn same_id_gives_same_person() {
        assert_eq!(person_for("31"), person_for("31"));
    }
}

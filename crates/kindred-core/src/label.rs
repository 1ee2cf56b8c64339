//! Human-readable relationship labels

/// "1st", "2nd", "3rd", "4th", "11th", "22nd", ...
pub fn ordinal_suffixed(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// "first" through "tenth", then suffixed numerals
pub fn ordinal_word(n: u32) -> String {
    const WORDS: [&str; 10] = [
        "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth",
        "tenth",
    ];
    match n {
        1..=10 => WORDS[n as usize - 1].to_string(),
        _ => ordinal_suffixed(n),
    }
}

/// "once removed", "twice removed", "3 times removed"
pub fn removed(n: u32) -> Option<String> {
    match n {
        0 => None,
        1 => Some("once removed".to_string()),
        2 => Some("twice removed".to_string()),
        _ => Some(format!("{} times removed", n)),
    }
}

/// Prefix for a relative `generations` steps away along a direct line,
/// where 1 is the base term ("parent"), 2 adds "grand" and so on.
fn lineal(generations: u32, base: &str) -> String {
    match generations {
        0 | 1 => base.to_string(),
        2 => format!("grand{}", base),
        3 => format!("great-grand{}", base),
        n => format!("{} great-grand{}", ordinal_suffixed(n - 2), base),
    }
}

/// Collateral term one generation off a sibling line ("aunt/uncle")
fn collateral(generations: u32, base: &str) -> String {
    match generations {
        0 | 1 => base.to_string(),
        2 => format!("great-{}", base),
        n => format!("{} great-{}", ordinal_suffixed(n - 1), base),
    }
}

pub fn ancestor(generations: u32) -> String {
    lineal(generations, "parent")
}

pub fn descendant(generations: u32) -> String {
    lineal(generations, "child")
}

/// `generations` is the distance from the younger side minus one
pub fn aunt_uncle(generations: u32) -> String {
    collateral(generations, "aunt/uncle")
}

pub fn niece_nephew(generations: u32) -> String {
    collateral(generations, "niece/nephew")
}

pub fn cousin(level: u32, removed_by: u32) -> String {
    let base = format!("{} cousin", ordinal_word(level));
    match removed(removed_by) {
        Some(suffix) => format!("{} {}", base, suffix),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals() {
        assert_eq!(ordinal_suffixed(1), "1st");
        assert_eq!(ordinal_suffixed(2), "2nd");
        assert_eq!(ordinal_suffixed(3), "3rd");
        assert_eq!(ordinal_suffixed(11), "11th");
        assert_eq!(ordinal_suffixed(12), "12th");
        assert_eq!(ordinal_suffixed(22), "22nd");
        assert_eq!(ordinal_word(2), "second");
        assert_eq!(ordinal_word(12), "12th");
    }

    #[test]
    fn test_lineal_labels() {
        assert_eq!(ancestor(1), "parent");
        assert_eq!(ancestor(2), "grandparent");
        assert_eq!(ancestor(3), "great-grandparent");
        assert_eq!(ancestor(4), "2nd great-grandparent");
        assert_eq!(descendant(5), "3rd great-grandchild");
    }

    #[test]
    fn test_collateral_labels() {
        assert_eq!(aunt_uncle(1), "aunt/uncle");
        assert_eq!(aunt_uncle(2), "great-aunt/uncle");
        assert_eq!(aunt_uncle(3), "2nd great-aunt/uncle");
        assert_eq!(niece_nephew(2), "great-niece/nephew");
    }

    #[test]
    fn test_cousin_labels() {
        assert_eq!(cousin(1, 0), "first cousin");
        assert_eq!(cousin(1, 1), "first cousin once removed");
        assert_eq!(cousin(2, 2), "second cousin twice removed");
        assert_eq!(cousin(3, 4), "third cousin 4 times removed");
    }
}

use bitcode::{Decode, Encode};

/// Circuit hunting preference for the peer, selected per outbound call
/// through the ANI suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub enum HuntPolicy {
    #[default]
    SeqAsc,
    SeqDesc,
    RrAsc,
    RrDesc,
}

impl HuntPolicy {
    /// Policy letter as dialed in the ANI suffix
    pub fn from_selector(c: char) -> Option<Self> {
        match c {
            'g' => Some(HuntPolicy::SeqAsc),
            'G' => Some(HuntPolicy::SeqDesc),
            'r' => Some(HuntPolicy::RrAsc),
            'R' => Some(HuntPolicy::RrDesc),
            _ => None,
        }
    }
}

/// Parsed `digits[@<policy><tg>]` ANI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AniSelector {
    /// ANI digits with the suffix stripped
    pub digits: String,
    /// Hunt policy, defaulting to sequential ascending when the selector
    /// letter is unknown or absent
    pub hunt_policy: HuntPolicy,
    /// Trunk group, dialed 1-based, stored 0-based
    pub trunk_group: usize,
}

/// Splits an ANI of the form `digits[@<policy><tg>]`. Without a suffix the
/// trunk group is 0 and hunting is sequential ascending.
pub fn parse_ani_suffix(ani: &str) -> AniSelector {
    let Some((digits, suffix)) = ani.split_once('@') else {
        return AniSelector {
            digits: ani.to_string(),
            hunt_policy: HuntPolicy::default(),
            trunk_group: 0,
        };
    };

    let mut chars = suffix.chars();
    let selector = chars.next();
    let tg_str: String = chars.collect();

    let hunt_policy = match selector.and_then(HuntPolicy::from_selector) {
        Some(policy) => policy,
        None => {
            tracing::warn!("Failed to determine huntgroup ({})", suffix);
            HuntPolicy::default()
        }
    };

    // Dialed 1-based; anything unparsable or zero maps to group 0
    let trunk_group = tg_str.parse::<usize>().ok().filter(|tg| *tg > 0).map(|tg| tg - 1).unwrap_or(0);

    AniSelector {
        digits: digits.to_string(),
        hunt_policy,
        trunk_group,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_ani() {
        let sel = parse_ani_suffix("5551212");
        assert_eq!(sel.digits, "5551212");
        assert_eq!(sel.hunt_policy, HuntPolicy::SeqAsc);
        assert_eq!(sel.trunk_group, 0);
    }

    #[test]
    fn test_policy_and_group() {
        let sel = parse_ani_suffix("5551212@g1");
        assert_eq!(sel.digits, "5551212");
        assert_eq!(sel.hunt_policy, HuntPolicy::SeqAsc);
        assert_eq!(sel.trunk_group, 0);

        let sel = parse_ani_suffix("5551212@R3");
        assert_eq!(sel.hunt_policy, HuntPolicy::RrDesc);
        assert_eq!(sel.trunk_group, 2);

        let sel = parse_ani_suffix("100@G12");
        assert_eq!(sel.hunt_policy, HuntPolicy::SeqDesc);
        assert_eq!(sel.trunk_group, 11);
    }

    #[test]
    fn test_bad_selector_falls_back() {
        let sel = parse_ani_suffix("100@x2");
        assert_eq!(sel.digits, "100");
        assert_eq!(sel.hunt_policy, HuntPolicy::SeqAsc);
        assert_eq!(sel.trunk_group, 1);
    }
}

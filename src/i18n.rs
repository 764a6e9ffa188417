//! Localized region descriptions and panel captions.
//!
//! Resolution is a pure function of (language, key). Unrecognized language
//! tags resolve to English without raising; the fallback is logged at
//! `debug` level only.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::catalog::{Region, RegionId};

/// Languages the site ships translations for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    En,
    Fr,
    Ar,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Fr, Language::Ar];

    /// Exact match on `en`, `fr` or `ar`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.tag() == tag)
    }

    /// Like [`Language::from_tag`] but falls back to English.
    pub fn resolve(tag: &str) -> Self {
        Self::from_tag(tag).unwrap_or_else(|| {
            log::debug!("unsupported language tag '{tag}', falling back to en");
            Language::En
        })
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
            Language::Ar => "ar",
        }
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, Language::Ar)
    }

    /// Digit-group separator used when formatting counts.
    pub fn group_separator(&self) -> char {
        match self {
            Language::Fr => '\u{202F}', // narrow no-break space
            Language::En | Language::Ar => ',',
        }
    }
}

/// Captions shown next to the region statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Labels {
    pub population: &'static str,
    pub area: &'static str,
    pub cities: &'static str,
    pub click_prompt: &'static str,
}

const LABELS_EN: Labels = Labels {
    population: "Population",
    area: "Area",
    cities: "Cities",
    click_prompt: "Click on a region to discover it",
};

const LABELS_FR: Labels = Labels {
    population: "Population",
    area: "Superficie",
    cities: "Villes",
    click_prompt: "Cliquez sur une région pour la découvrir",
};

const LABELS_AR: Labels = Labels {
    population: "السكان",
    area: "المساحة",
    cities: "المدن",
    click_prompt: "انقر على منطقة لاكتشافها",
};

/// Built-in description overrides, keyed by (language, region id).
const DESCRIPTIONS: &[(Language, RegionId, &str)] = &[
    (
        Language::En,
        "laayoune",
        "Laâyoune-Sakia El Hamra is the cradle of Hassani poetry and of the nomadic camps of the Sakia El Hamra valley.",
    ),
    (
        Language::En,
        "dakhla",
        "Dakhla-Oued Ed-Dahab stretches along the Atlantic, where desert traditions meet fishing life around the lagoon.",
    ),
    (
        Language::En,
        "guelmim",
        "Guelmim-Oued Noun, the gateway to the Sahara, is known for its camel market and its mix of Hassani and Amazigh heritage.",
    ),
    (
        Language::En,
        "souss",
        "Souss-Massa links the argan plains to the caravan routes that carried Sahrawi trade northward.",
    ),
    (
        Language::Fr,
        "laayoune",
        "Laâyoune-Sakia El Hamra est le berceau de la poésie hassanie et des campements nomades de la vallée de la Sakia El Hamra.",
    ),
    (
        Language::Fr,
        "dakhla",
        "Dakhla-Oued Ed-Dahab s'étend le long de l'Atlantique, où les traditions du désert rencontrent la pêche autour de la lagune.",
    ),
    (
        Language::Fr,
        "guelmim",
        "Guelmim-Oued Noun, porte du Sahara, est célèbre pour son marché aux chameaux et son héritage hassani et amazigh.",
    ),
    (
        Language::Fr,
        "souss",
        "Souss-Massa relie les plaines de l'arganier aux routes caravanières du commerce sahraoui.",
    ),
    (
        Language::Ar,
        "laayoune",
        "العيون الساقية الحمراء مهد الشعر الحساني ومخيمات الرحل في وادي الساقية الحمراء.",
    ),
    (
        Language::Ar,
        "dakhla",
        "الداخلة وادي الذهب تمتد على طول المحيط الأطلسي حيث تلتقي تقاليد الصحراء بحياة الصيد حول البحيرة.",
    ),
    (
        Language::Ar,
        "guelmim",
        "كلميم واد نون بوابة الصحراء، مشهورة بسوق الإبل وبتراثها الحساني والأمازيغي.",
    ),
    (
        Language::Ar,
        "souss",
        "سوس ماسة تربط سهول الأركان بطرق القوافل التي حملت التجارة الصحراوية شمالا.",
    ),
];

/// Resolves localized text for regions and panel captions.
#[derive(Debug, Clone)]
pub struct LocalizationResolver {
    overrides: HashMap<(Language, Cow<'static, str>), String>,
}

impl LocalizationResolver {
    /// Resolver with the built-in description overrides.
    pub fn builtin() -> Self {
        Self::with_overrides(
            DESCRIPTIONS
                .iter()
                .map(|&(lang, id, text)| (lang, id, text.to_string())),
        )
    }

    /// Resolver with no overrides: every description is the catalog's
    /// English fallback.
    pub fn empty() -> Self {
        Self {
            overrides: HashMap::new(),
        }
    }

    pub fn with_overrides<K>(entries: impl IntoIterator<Item = (Language, K, String)>) -> Self
    where
        K: Into<Cow<'static, str>>,
    {
        Self {
            overrides: entries
                .into_iter()
                .map(|(lang, id, text)| ((lang, id.into()), text))
                .collect(),
        }
    }

    /// Localized description: the override for (language, region id) if
    /// present, otherwise the region's English description.
    pub fn describe<'a>(&'a self, region: &'a Region, tag: &str) -> &'a str {
        self.describe_in(region, Language::resolve(tag))
    }

    pub fn describe_in<'a>(&'a self, region: &'a Region, lang: Language) -> &'a str {
        self.overrides
            .get(&(lang, Cow::Borrowed(region.id)))
            .map(String::as_str)
            .unwrap_or(region.stats.description)
    }

    pub fn labels(&self, tag: &str) -> Labels {
        labels_for(Language::resolve(tag))
    }
}

impl Default for LocalizationResolver {
    fn default() -> Self {
        Self::builtin()
    }
}

pub fn labels_for(lang: Language) -> Labels {
    match lang {
        Language::En => LABELS_EN,
        Language::Fr => LABELS_FR,
        Language::Ar => LABELS_AR,
    }
}

/// Format a count with the language's digit grouping, e.g. `367,758`.
pub fn format_count(value: u64, lang: Language) -> String {
    let digits = value.to_string();
    let sep = lang.group_separator();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * sep.len_utf8());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{REGIONS, RegionCatalog};

    #[test]
    fn recognized_tags() {
        assert_eq!(Language::from_tag("en"), Some(Language::En));
        assert_eq!(Language::from_tag("fr"), Some(Language::Fr));
        assert_eq!(Language::from_tag("ar"), Some(Language::Ar));
        assert_eq!(Language::from_tag("FR"), None);
        assert_eq!(Language::from_tag(" ar "), None);
        assert_eq!(Language::from_tag("es"), None);
        assert_eq!(Language::from_tag("fr-FR"), None);
    }

    #[test]
    fn unknown_tag_resolves_to_english() {
        assert_eq!(Language::resolve("de"), Language::En);
        assert_eq!(Language::resolve(""), Language::En);
    }

    #[test]
    fn describe_uses_override_for_supported_languages() {
        let resolver = LocalizationResolver::builtin();
        let catalog = RegionCatalog::builtin();
        for region in catalog.all() {
            for lang in Language::ALL {
                let text = resolver.describe(region, lang.tag());
                let expected = DESCRIPTIONS
                    .iter()
                    .find(|(l, id, _)| *l == lang && *id == region.id)
                    .map(|(_, _, t)| *t)
                    .unwrap();
                assert_eq!(text, expected);
            }
        }
    }

    #[test]
    fn describe_falls_back_for_unknown_language() {
        let resolver = LocalizationResolver::builtin();
        for region in REGIONS {
            for tag in ["es", "de", "zz", "", "fr-FR"] {
                assert_eq!(resolver.describe(region, tag), region.stats.description);
            }
        }
    }

    #[test]
    fn describe_falls_back_for_missing_pair() {
        let resolver = LocalizationResolver::with_overrides([(
            Language::Fr,
            "dakhla".to_string(),
            "Texte".to_string(),
        )]);
        let dakhla = &REGIONS[1];
        let souss = &REGIONS[3];
        assert_eq!(resolver.describe(dakhla, "fr"), "Texte");
        assert_eq!(resolver.describe(dakhla, "ar"), dakhla.stats.description);
        assert_eq!(resolver.describe(souss, "fr"), souss.stats.description);
    }

    #[test]
    fn owned_and_static_override_keys_agree() {
        let dakhla = &REGIONS[1];
        let owned = LocalizationResolver::with_overrides([(
            Language::Ar,
            String::from("dakhla"),
            "نص".to_string(),
        )]);
        let borrowed =
            LocalizationResolver::with_overrides([(Language::Ar, "dakhla", "نص".to_string())]);
        assert_eq!(owned.describe(dakhla, "ar"), "نص");
        assert_eq!(borrowed.describe(dakhla, "ar"), "نص");
    }

    #[test]
    fn empty_resolver_always_falls_back() {
        let resolver = LocalizationResolver::empty();
        assert_eq!(resolver.describe(&REGIONS[0], "ar"), REGIONS[0].stats.description);
    }

    #[test]
    fn labels_per_language() {
        let resolver = LocalizationResolver::builtin();
        assert_eq!(resolver.labels("en").area, "Area");
        assert_eq!(resolver.labels("fr").area, "Superficie");
        assert_eq!(resolver.labels("ar").cities, "المدن");
        assert_eq!(resolver.labels("klingon"), LABELS_EN);
    }

    #[test]
    fn only_arabic_is_rtl() {
        assert!(Language::Ar.is_rtl());
        assert!(!Language::En.is_rtl());
        assert!(!Language::Fr.is_rtl());
    }

    #[test]
    fn count_grouping() {
        assert_eq!(format_count(0, Language::En), "0");
        assert_eq!(format_count(999, Language::En), "999");
        assert_eq!(format_count(1_000, Language::En), "1,000");
        assert_eq!(format_count(2_676_847, Language::En), "2,676,847");
        assert_eq!(format_count(367_758, Language::Fr), "367\u{202F}758");
    }
}

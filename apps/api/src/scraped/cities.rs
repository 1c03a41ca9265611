//! Hebrew -> English city names for scraped listings.

/// Ordered: longer, more specific spellings come before the shorter keys they
/// contain, so substring matching resolves to the most specific entry first.
pub const CITY_TABLE: &[(&str, &str)] = &[
    ("תל אביב-יפו", "Tel Aviv"),
    ("תל אביב יפו", "Tel Aviv"),
    ("תל אביב", "Tel Aviv"),
    ("ירושלים", "Jerusalem"),
    ("חיפה", "Haifa"),
    ("באר שבע", "Beer Sheva"),
    ("הרצליה", "Herzliya"),
    ("רעננה", "Ra'anana"),
    ("פתח תקווה", "Petah Tikva"),
    ("פתח תקוה", "Petah Tikva"),
    ("ראשון לציון", "Rishon LeZion"),
    ("נתניה", "Netanya"),
    ("רמת גן", "Ramat Gan"),
    ("רמת השרון", "Ramat HaSharon"),
    ("גבעתיים", "Givatayim"),
    ("חולון", "Holon"),
    ("בת ים", "Bat Yam"),
    ("בני ברק", "Bnei Brak"),
    ("אשדוד", "Ashdod"),
    ("אשקלון", "Ashkelon"),
    ("רחובות", "Rehovot"),
    ("נס ציונה", "Ness Ziona"),
    ("כפר סבא", "Kfar Saba"),
    ("הוד השרון", "Hod HaSharon"),
    ("ראש העין", "Rosh HaAyin"),
    ("מודיעין-מכבים-רעות", "Modiin"),
    ("מודיעין", "Modiin"),
    ("יקנעם", "Yokneam"),
    ("נצרת", "Nazareth"),
    ("עפולה", "Afula"),
    ("טבריה", "Tiberias"),
    ("כרמיאל", "Karmiel"),
    ("אילת", "Eilat"),
    ("בית שמש", "Beit Shemesh"),
    ("קיסריה", "Caesarea"),
    ("לוד", "Lod"),
    ("רמלה", "Ramla"),
    ("אור יהודה", "Or Yehuda"),
    ("יהוד", "Yehud"),
    ("קריית גת", "Kiryat Gat"),
    ("קרית גת", "Kiryat Gat"),
    ("קריית אונו", "Kiryat Ono"),
    ("מעלה אדומים", "Ma'ale Adumim"),
    ("אריאל", "Ariel"),
    ("חדרה", "Hadera"),
    ("זכרון יעקב", "Zichron Yaakov"),
    ("ישראל", "Israel"),
];

pub const DEFAULT_LOCATION: &str = "Israel";

/// Translates a raw city string.
///
/// Exact match wins; otherwise the first key that is contained in the raw
/// value, or that starts with it, is used. Unknown values pass through
/// trimmed; a missing or blank value becomes "Israel".
pub fn translate_city(raw: Option<&str>) -> String {
    let raw = match raw.map(str::trim) {
        Some(r) if !r.is_empty() => r,
        _ => return DEFAULT_LOCATION.to_string(),
    };

    if let Some((_, english)) = CITY_TABLE.iter().find(|(hebrew, _)| *hebrew == raw) {
        return english.to_string();
    }

    CITY_TABLE
        .iter()
        .find(|(hebrew, _)| raw.contains(hebrew) || hebrew.starts_with(raw))
        .map(|(_, english)| english.to_string())
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert_eq!(translate_city(Some("ירושלים")), "Jerusalem");
        assert_eq!(translate_city(Some("תל אביב-יפו")), "Tel Aviv");
    }

    #[test]
    fn test_every_table_entry_maps_verbatim() {
        for (hebrew, english) in CITY_TABLE {
            assert_eq!(translate_city(Some(hebrew)), *english);
        }
    }

    #[test]
    fn test_substring_match() {
        assert_eq!(translate_city(Some("חיפה והקריות")), "Haifa");
        assert_eq!(translate_city(Some("אזור תעשייה הרצליה פיתוח")), "Herzliya");
    }

    #[test]
    fn test_no_key_shadows_a_later_one() {
        for (i, (earlier, _)) in CITY_TABLE.iter().enumerate() {
            for (later, _) in &CITY_TABLE[i + 1..] {
                assert!(
                    !later.contains(earlier),
                    "{earlier} precedes and is contained in {later}"
                );
            }
        }
    }

    #[test]
    fn test_substring_prefers_longer_key() {
        assert_eq!(translate_city(Some("אור יהודה, מרכז")), "Or Yehuda");
        assert_eq!(translate_city(Some("יהוד-מונוסון")), "Yehud");
    }

    #[test]
    fn test_prefix_match() {
        assert_eq!(translate_city(Some("פתח")), "Petah Tikva");
    }

    #[test]
    fn test_unmapped_passes_through() {
        assert_eq!(translate_city(Some("Kiryat Malakhi")), "Kiryat Malakhi");
        assert_eq!(translate_city(Some("  Sderot ")), "Sderot");
    }

    #[test]
    fn test_missing_defaults_to_israel() {
        assert_eq!(translate_city(None), "Israel");
        assert_eq!(translate_city(Some("   ")), "Israel");
    }
}

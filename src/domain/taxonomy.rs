//! Static code → label tables.
//!
//! Tables are ordered arrays of pairs, not maps: the order drives stacking in
//! stacked charts and the default (pre-sort) order of rankings, so it must never
//! be recomputed.

/// A fixed, ordered `(code, label)` table.
#[derive(Debug, Clone, Copy)]
pub struct TaxonomyTable {
    entries: &'static [(&'static str, &'static str)],
}

impl TaxonomyTable {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &'static [(&'static str, &'static str)] {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Codes in table order.
    pub fn codes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(code, _)| *code)
    }

    pub fn position(&self, code: &str) -> Option<usize> {
        self.entries.iter().position(|(c, _)| *c == code)
    }

    pub fn label(&self, code: &str) -> Option<&'static str> {
        self.entries.iter().find(|(c, _)| *c == code).map(|(_, label)| *label)
    }

    /// Label for `code`, or the code itself when it is not in the table.
    pub fn label_or_code<'a>(&self, code: &'a str) -> &'a str {
        self.label(code).unwrap_or(code)
    }
}

/// Age brackets, youngest first.
pub const AGE_BRACKETS: TaxonomyTable = TaxonomyTable::new(
    &[
        ("under10", "10歳未満"),
        ("teens", "10代"),
        ("twenties", "20代"),
        ("thirties", "30代"),
        ("forties", "40代"),
        ("fifties", "50代"),
        ("sixties", "60代"),
        ("seventies", "70代"),
        ("eighties", "80代"),
        ("nineties", "90歳以上"),
    ],
);

pub const AGE_BRACKET_COUNT: usize = 10;

/// Free-text header prefix used by the age-bracket extract (`<prefix><label>`).
pub const AGE_HEADER_PREFIX: &str = "【年代別】新規感染者数_";

/// Coarser age groups used by the monthly age chart, in display order.
pub const AGE_DISPLAY_GROUPS: &[(&str, &[&str])] = &[
    ("10代以下", &["under10", "teens"]),
    ("20代", &["twenties"]),
    ("30代", &["thirties"]),
    ("40代", &["forties"]),
    ("50代", &["fifties"]),
    ("60代", &["sixties"]),
    ("70代以上", &["seventies", "eighties", "nineties"]),
];

/// Prefectures in JIS code order (01 Hokkaido … 47 Okinawa).
pub const PREFECTURES: TaxonomyTable = TaxonomyTable::new(
    &[
        ("Hokkaido", "北海道"),
        ("Aomori", "青森県"),
        ("Iwate", "岩手県"),
        ("Miyagi", "宮城県"),
        ("Akita", "秋田県"),
        ("Yamagata", "山形県"),
        ("Fukushima", "福島県"),
        ("Ibaraki", "茨城県"),
        ("Tochigi", "栃木県"),
        ("Gunma", "群馬県"),
        ("Saitama", "埼玉県"),
        ("Chiba", "千葉県"),
        ("Tokyo", "東京都"),
        ("Kanagawa", "神奈川県"),
        ("Niigata", "新潟県"),
        ("Toyama", "富山県"),
        ("Ishikawa", "石川県"),
        ("Fukui", "福井県"),
        ("Yamanashi", "山梨県"),
        ("Nagano", "長野県"),
        ("Gifu", "岐阜県"),
        ("Shizuoka", "静岡県"),
        ("Aichi", "愛知県"),
        ("Mie", "三重県"),
        ("Shiga", "滋賀県"),
        ("Kyoto", "京都府"),
        ("Osaka", "大阪府"),
        ("Hyogo", "兵庫県"),
        ("Nara", "奈良県"),
        ("Wakayama", "和歌山県"),
        ("Tottori", "鳥取県"),
        ("Shimane", "島根県"),
        ("Okayama", "岡山県"),
        ("Hiroshima", "広島県"),
        ("Yamaguchi", "山口県"),
        ("Tokushima", "徳島県"),
        ("Kagawa", "香川県"),
        ("Ehime", "愛媛県"),
        ("Kochi", "高知県"),
        ("Fukuoka", "福岡県"),
        ("Saga", "佐賀県"),
        ("Nagasaki", "長崎県"),
        ("Kumamoto", "熊本県"),
        ("Oita", "大分県"),
        ("Miyazaki", "宮崎県"),
        ("Kagoshima", "鹿児島県"),
        ("Okinawa", "沖縄県"),
    ],
);

pub const PREFECTURE_COUNT: usize = 47;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_sizes_are_fixed() {
        assert_eq!(AGE_BRACKETS.len(), AGE_BRACKET_COUNT);
        assert_eq!(PREFECTURES.len(), PREFECTURE_COUNT);
    }

    #[test]
    fn prefecture_order_is_geographic() {
        let codes: Vec<_> = PREFECTURES.codes().collect();
        assert_eq!(codes.first(), Some(&"Hokkaido"));
        assert_eq!(codes[12], "Tokyo");
        assert_eq!(codes.last(), Some(&"Okinawa"));
    }

    #[test]
    fn unknown_code_falls_back_to_code() {
        assert_eq!(AGE_BRACKETS.label("teens"), Some("10代"));
        assert_eq!(AGE_BRACKETS.label_or_code("centenarians"), "centenarians");
        assert_eq!(AGE_BRACKETS.position("nineties"), Some(9));
    }

    #[test]
    fn display_groups_cover_every_bracket_once() {
        let mut seen: Vec<&str> = AGE_DISPLAY_GROUPS
            .iter()
            .flat_map(|(_, members)| members.iter().copied())
            .collect();
        seen.sort_unstable();
        let mut all: Vec<&str> = AGE_BRACKETS.codes().collect();
        all.sort_unstable();
        assert_eq!(seen, all);
    }
}

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// `RMPlaylist_<title>_<YYYYMMDD>.csv`, the file name RiMusic gives its exports.
static EXPORT_FILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^RMPlaylist_(?P<title>[^_]+)_(?P<year>[0-9]{4})(?P<month>[0-9]{2})(?P<day>[0-9]{2})\.csv$",
    )
    .expect("export file name pattern is valid")
});

/// Derives the playlist name from an export's file name.
///
/// `RMPlaylist_SummerHits_20230915.csv` becomes `2023-09-15 SummerHits`.
/// Anything else is prefixed with today's date instead.
pub fn derive_playlist_name(file_name: &str) -> String {
    derive_playlist_name_on(file_name, chrono::Local::now().date_naive())
}

/// Like [`derive_playlist_name`], with `today` used for names that don't match.
pub fn derive_playlist_name_on(file_name: &str, today: NaiveDate) -> String {
    match EXPORT_FILE_NAME.captures(file_name) {
        Some(captures) => format!(
            "{}-{}-{} {}",
            &captures["year"], &captures["month"], &captures["day"], &captures["title"]
        ),
        None => {
            log::debug!("Export file name {file_name:?} has no date, naming playlist after today");
            format!("{} {}", today.format("%Y-%m-%d"), file_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    }

    #[test]
    fn test_derive_name_from_export_file_name() {
        assert_eq!(
            derive_playlist_name("RMPlaylist_SummerHits_20230915.csv"),
            "2023-09-15 SummerHits"
        );
    }

    #[test]
    fn test_title_is_kept_verbatim() {
        assert_eq!(
            derive_playlist_name_on("RMPlaylist_Road Trip (2023) ♪_20231231.csv", today()),
            "2023-12-31 Road Trip (2023) ♪"
        );
    }

    #[test]
    fn test_date_digits_are_not_validated_as_calendar_date() {
        assert_eq!(
            derive_playlist_name_on("RMPlaylist_Mix_20231399.csv", today()),
            "2023-13-99 Mix"
        );
    }

    #[test]
    fn test_fallback_uses_today() {
        assert_eq!(
            derive_playlist_name_on("my playlist.csv", today()),
            "2024-02-29 my playlist.csv"
        );
    }

    #[test]
    fn test_fallback_for_near_misses() {
        for file_name in [
            "RMPlaylist_Title_With_Underscores_20230915.csv",
            "RMPlaylist_SummerHits_2023091.csv",
            "RMPlaylist_SummerHits_202309150.csv",
            "RMPlaylist_SummerHits_2023-09-15.csv",
            "RMPlaylist_SummerHits_20230915.txt",
            "RMPlaylist_Mix_٢٠٢٣٠٩١٥.csv",
            "RMPlaylist_Mix_２０２３０９１５.csv",
            "RMPlaylist__20230915.csv",
            "Playlist_SummerHits_20230915.csv",
            "",
        ] {
            assert_eq!(
                derive_playlist_name_on(file_name, today()),
                format!("2024-02-29 {file_name}"),
                "{file_name:?} should fall back"
            );
        }
    }

    #[test]
    fn test_fallback_with_system_clock_is_date_prefixed() {
        let name = derive_playlist_name("export.csv");
        let (date, rest) = name.split_once(' ').unwrap();
        assert_eq!(rest, "export.csv");
        assert!(NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok());
    }
}

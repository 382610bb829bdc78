//! Interface strings.
//!
//! The station broadcasts in Ukrainian on Thursdays and in Russian on the
//! other days; the interface follows the same calendar unless a language is
//! forced in the configuration (`player.language`).

use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate, Weekday};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Language {
    Ukrainian,
    Russian,
}

impl Language {
    pub fn for_date(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Thu => Language::Ukrainian,
            _ => Language::Russian,
        }
    }

    pub fn today() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::Ukrainian => "uk",
            Language::Russian => "ru",
        }
    }
}

/// `auto` follows the broadcast calendar, anything else pins a language.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LanguagePreference {
    #[default]
    Auto,
    Fixed(Language),
}

impl LanguagePreference {
    pub fn resolve(self, date: NaiveDate) -> Language {
        match self {
            LanguagePreference::Auto => Language::for_date(date),
            LanguagePreference::Fixed(language) => language,
        }
    }

    pub fn today(self) -> Language {
        self.resolve(Local::now().date_naive())
    }
}

impl FromStr for LanguagePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(LanguagePreference::Auto),
            "uk" | "ua" | "ukrainian" => Ok(LanguagePreference::Fixed(Language::Ukrainian)),
            "ru" | "russian" => Ok(LanguagePreference::Fixed(Language::Russian)),
            other => Err(format!("unknown language: {other}")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocalizableString {
    OnAir,
    UnknownTrack,
    UnknownArtist,
    NoTrackInfoErrorMessage,
    MusicQualityBest,
    Quality,
    Error,
    NoInternetConnection,
}

impl LocalizableString {
    pub fn text(self, language: Language) -> &'static str {
        use LocalizableString::*;
        match language {
            Language::Ukrainian => match self {
                OnAir => "Прямий ефір",
                UnknownTrack => "Невідомий трек",
                UnknownArtist => "Невідомий виконавець",
                NoTrackInfoErrorMessage => "Йой, щось пішло шкереберть!",
                MusicQualityBest => "Найкраща",
                Quality => "Якість",
                Error => "Помилка",
                NoInternetConnection => "Інтернет звя'зок відсутній!",
            },
            Language::Russian => match self {
                OnAir => "Прямой эфир",
                UnknownTrack => "Неизвестный трек",
                UnknownArtist => "Неизвестный исполнитель",
                NoTrackInfoErrorMessage => "Упс, что-то пошло не так!",
                MusicQualityBest => "Лучшее",
                Quality => "Качество",
                Error => "Ошибка",
                NoInternetConnection => "Интернет связь отсутствует!",
            },
        }
    }
}

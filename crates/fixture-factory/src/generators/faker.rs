//! Locale-aware random-data provider backed by the `fake` crate.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use fake::faker::address::raw::{CityName, CountryName, StateName, StreetName, ZipCode};
use fake::faker::impls::address::CityNameGenFn;
use fake::faker::boolean::raw::Boolean;
use fake::faker::company::raw::{CompanyName, Industry};
use fake::faker::internet::raw::{
    DomainSuffix, FreeEmail, IPv4, Password, SafeEmail, Username,
};
use fake::faker::lorem::raw::{Paragraph, Sentence, Word, Words};
use fake::faker::name::raw::{FirstName, LastName, Name, Title};
use fake::faker::number::raw::Digit;
use fake::faker::phone_number::raw::PhoneNumber;
use fake::locales::{Data, EN, FR_FR, JA_JP, PT_BR, ZH_CN, ZH_TW};
use fake::{Dummy, Fake};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{FactoryError, Result};
use crate::kind::Descriptor;
use crate::value::Value;

/// Upper bound for length and count arguments of text formatters.
pub const MAX_TEXT_COUNT: usize = 10_000;

/// Locales the provider can generate text for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "fr_FR")]
    FrFr,
    #[serde(rename = "pt_BR")]
    PtBr,
    #[serde(rename = "ja_JP")]
    JaJp,
    #[serde(rename = "zh_CN")]
    ZhCn,
    #[serde(rename = "zh_TW")]
    ZhTw,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::FrFr => "fr_FR",
            Locale::PtBr => "pt_BR",
            Locale::JaJp => "ja_JP",
            Locale::ZhCn => "zh_CN",
            Locale::ZhTw => "zh_TW",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Unsupported locale: {0}")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "en" | "en_us" | "en_gb" => Ok(Locale::En),
            "fr" | "fr_fr" => Ok(Locale::FrFr),
            "pt_br" => Ok(Locale::PtBr),
            "ja" | "ja_jp" => Ok(Locale::JaJp),
            "zh_cn" => Ok(Locale::ZhCn),
            "zh_tw" => Ok(Locale::ZhTw),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

/// Random-data provider handed to generators and invocable kinds.
///
/// Also remembers values produced under `unique:` descriptors, so a fresh provider
/// (after a locale change) starts with empty uniqueness memory.
pub struct Faker {
    locale: Locale,
    rng: StdRng,
    unique: HashMap<String, HashSet<String>>,
}

impl Faker {
    /// Names of every formatter [`Faker::format`] understands.
    pub const FORMATTERS: &'static [&'static str] = &[
        "name",
        "first_name",
        "last_name",
        "title",
        "email",
        "safe_email",
        "free_email",
        "username",
        "password",
        "domain_suffix",
        "ipv4",
        "word",
        "words",
        "sentence",
        "paragraph",
        "city",
        "country",
        "street",
        "zip_code",
        "state",
        "company",
        "industry",
        "phone_number",
        "boolean",
        "digit",
        "number",
        "float",
        "normal",
        "choice",
        "uuid",
        "pattern",
    ];

    pub fn new(locale: Locale) -> Self {
        Self::with_rng(locale, StdRng::from_entropy())
    }

    /// Creates a provider whose output is reproducible for a given seed.
    pub fn seeded(locale: Locale, seed: u64) -> Self {
        Self::with_rng(locale, StdRng::seed_from_u64(seed))
    }

    fn with_rng(locale: Locale, rng: StdRng) -> Self {
        Self {
            locale,
            rng,
            unique: HashMap::new(),
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Generates a value from a descriptor string such as `"sentence|3;8"`.
    ///
    /// `unique:`/`optional:` modifiers are only honoured by the factory dispatcher.
    pub fn generate(&mut self, descriptor: &str) -> Result<Value> {
        self.format(&Descriptor::parse(descriptor))
    }

    /// Produces a value for a formatter named by `descriptor.name`.
    pub fn format(&mut self, descriptor: &Descriptor) -> Result<Value> {
        if let Some(value) = self.format_unlocalized(descriptor)? {
            return Ok(value);
        }

        let localized = match self.locale {
            Locale::En => localized(EN, descriptor, &mut self.rng)?,
            Locale::FrFr => localized(FR_FR, descriptor, &mut self.rng)?,
            Locale::PtBr => localized(PT_BR, descriptor, &mut self.rng)?,
            Locale::JaJp => localized(JA_JP, descriptor, &mut self.rng)?,
            Locale::ZhCn => localized(ZH_CN, descriptor, &mut self.rng)?,
            Locale::ZhTw => localized(ZH_TW, descriptor, &mut self.rng)?,
        };

        localized.ok_or_else(|| FactoryError::UnknownGenerator(descriptor.name.clone()))
    }

    /// Records `value` for `key`, returning whether it had not been seen before.
    pub(crate) fn remember_unique(&mut self, key: &str, value: &Value) -> bool {
        self.unique
            .entry(key.to_string())
            .or_default()
            .insert(value.identity_key())
    }

    fn format_unlocalized(&mut self, descriptor: &Descriptor) -> Result<Option<Value>> {
        let value = match descriptor.name.as_str() {
            "number" => {
                let min = parse_arg(descriptor, 0, 0i64)?;
                let max = parse_arg(descriptor, 1, 1000i64)?;
                if min > max {
                    return Err(FactoryError::invalid_descriptor(
                        descriptor.as_str(),
                        "min must not exceed max",
                    ));
                }
                Value::from(self.rng.gen_range(min..=max))
            }
            "float" => {
                let min = finite_arg(descriptor, 0, 0.0)?;
                let max = finite_arg(descriptor, 1, 1.0)?;
                if min > max {
                    return Err(FactoryError::invalid_descriptor(
                        descriptor.as_str(),
                        "min must not exceed max",
                    ));
                }
                if !(max - min).is_finite() {
                    return Err(FactoryError::invalid_descriptor(
                        descriptor.as_str(),
                        "range is too wide",
                    ));
                }
                if min == max {
                    Value::from(min)
                } else {
                    Value::from(self.rng.gen_range(min..max))
                }
            }
            "normal" => {
                let mean = finite_arg(descriptor, 0, 0.0)?;
                let std_dev = finite_arg(descriptor, 1, 1.0)?;
                let normal = Normal::new(mean, std_dev).map_err(|e| {
                    FactoryError::invalid_descriptor(descriptor.as_str(), e.to_string())
                })?;
                Value::from(normal.sample(&mut self.rng))
            }
            "choice" => {
                let options: Vec<&String> =
                    descriptor.args.iter().filter(|arg| !arg.is_empty()).collect();
                if options.is_empty() {
                    return Err(FactoryError::invalid_descriptor(
                        descriptor.as_str(),
                        "expected at least one option",
                    ));
                }
                Value::from(options[self.rng.gen_range(0..options.len())].as_str())
            }
            "uuid" => {
                let bytes: [u8; 16] = self.rng.r#gen();
                Value::from(uuid::Builder::from_random_bytes(bytes).into_uuid().to_string())
            }
            "pattern" => {
                let pattern = descriptor.args.join(";");
                Value::from(self.fill_pattern(&pattern))
            }
            _ => return Ok(None),
        };

        Ok(Some(value))
    }

    /// Replaces `#` with a digit, `?` with a letter and `*` with either.
    fn fill_pattern(&mut self, pattern: &str) -> String {
        const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
        const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

        pattern
            .chars()
            .map(|c| match c {
                '#' => char::from(b'0' + self.rng.gen_range(0..10u8)),
                '?' => char::from(LETTERS[self.rng.gen_range(0..LETTERS.len())]),
                '*' => char::from(ALPHANUMERIC[self.rng.gen_range(0..ALPHANUMERIC.len())]),
                other => other,
            })
            .collect()
    }
}

impl fmt::Debug for Faker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Faker")
            .field("locale", &self.locale)
            .field("unique_keys", &self.unique.len())
            .finish()
    }
}

fn localized<L: Data + CityNameGenFn + Copy>(
    locale: L,
    descriptor: &Descriptor,
    rng: &mut StdRng,
) -> Result<Option<Value>> {
    let value = match descriptor.name.as_str() {
        "name" => fake_string(Name(locale), rng),
        "first_name" => fake_string(FirstName(locale), rng),
        "last_name" => fake_string(LastName(locale), rng),
        "title" => fake_string(Title(locale), rng),
        "email" | "safe_email" => fake_string(SafeEmail(locale), rng),
        "free_email" => fake_string(FreeEmail(locale), rng),
        "username" => fake_string(Username(locale), rng),
        "password" => fake_string(Password(locale, usize_range(descriptor, 8, 20)?), rng),
        "domain_suffix" => fake_string(DomainSuffix(locale), rng),
        "ipv4" => fake_string(IPv4(locale), rng),
        "word" => fake_string(Word(locale), rng),
        "words" => {
            let words: Vec<String> =
                Words(locale, usize_range(descriptor, 3, 6)?).fake_with_rng(rng);
            Value::from(serde_json::Value::from(words))
        }
        "sentence" => fake_string(Sentence(locale, usize_range(descriptor, 4, 10)?), rng),
        "paragraph" => fake_string(Paragraph(locale, usize_range(descriptor, 3, 6)?), rng),
        "city" => fake_string(CityName(locale), rng),
        "country" => fake_string(CountryName(locale), rng),
        "street" => fake_string(StreetName(locale), rng),
        "zip_code" => fake_string(ZipCode(locale), rng),
        "state" => fake_string(StateName(locale), rng),
        "company" => fake_string(CompanyName(locale), rng),
        "industry" => fake_string(Industry(locale), rng),
        "phone_number" => fake_string(PhoneNumber(locale), rng),
        "digit" => fake_string(Digit(locale), rng),
        "boolean" => {
            let ratio: u8 = parse_arg(descriptor, 0, 50u8)?;
            let value: bool = Boolean(locale, ratio.min(100)).fake_with_rng(rng);
            Value::from(value)
        }
        _ => return Ok(None),
    };

    Ok(Some(value))
}

fn fake_string<F>(faker: F, rng: &mut StdRng) -> Value
where
    String: Dummy<F>,
{
    let value: String = faker.fake_with_rng(rng);
    Value::from(value)
}

fn parse_arg<T: FromStr>(descriptor: &Descriptor, index: usize, default: T) -> Result<T> {
    match descriptor.arg(index) {
        Some(arg) => arg.parse().map_err(|_| {
            FactoryError::invalid_descriptor(
                descriptor.as_str(),
                format!("argument {} (`{arg}`) is not a valid number", index + 1),
            )
        }),
        None => Ok(default),
    }
}

fn finite_arg(descriptor: &Descriptor, index: usize, default: f64) -> Result<f64> {
    let value = parse_arg(descriptor, index, default)?;
    if !value.is_finite() {
        return Err(FactoryError::invalid_descriptor(
            descriptor.as_str(),
            format!("argument {} must be a finite number", index + 1),
        ));
    }
    Ok(value)
}

/// Inclusive `min;max` argument pair as the half-open range `fake` expects.
fn usize_range(
    descriptor: &Descriptor,
    min: usize,
    max: usize,
) -> Result<std::ops::Range<usize>> {
    let min = parse_arg(descriptor, 0, min)?;
    let max = parse_arg(descriptor, 1, max.max(min))?;
    if min > max {
        return Err(FactoryError::invalid_descriptor(
            descriptor.as_str(),
            "min must not exceed max",
        ));
    }
    if max > MAX_TEXT_COUNT {
        return Err(FactoryError::invalid_descriptor(
            descriptor.as_str(),
            format!("max must not exceed {MAX_TEXT_COUNT}"),
        ));
    }
    Ok(min..max + 1)
}

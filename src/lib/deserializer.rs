// SPDX-License-Identifier: Apache-2.0

use std::convert::TryFrom;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{de, de::Visitor, Deserializer};

// The controller is free to encode integers as JSON numbers or as strings,
// sometimes hex encoded with `0x` prefix.
pub(crate) fn parse_u64_str<E>(value: &str) -> Result<u64, E>
where
    E: de::Error,
{
    let value = value.trim();
    if let Some(hex) =
        value.strip_prefix("0x").or_else(|| value.strip_prefix("0X"))
    {
        u64::from_str_radix(hex, 16).map_err(de::Error::custom)
    } else {
        FromStr::from_str(value).map_err(de::Error::custom)
    }
}

struct IntegerOrString<T>(PhantomData<fn() -> T>);

impl<'de, T> Visitor<'de> for IntegerOrString<T>
where
    T: TryFrom<u64>,
    <T as TryFrom<u64>>::Error: std::fmt::Display,
{
    type Value = T;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("unsigned integer or string")
    }

    fn visit_str<E>(self, value: &str) -> Result<T, E>
    where
        E: de::Error,
    {
        T::try_from(parse_u64_str::<E>(value)?).map_err(de::Error::custom)
    }

    fn visit_u64<E>(self, value: u64) -> Result<T, E>
    where
        E: de::Error,
    {
        T::try_from(value).map_err(de::Error::custom)
    }

    fn visit_i64<E>(self, value: i64) -> Result<T, E>
    where
        E: de::Error,
    {
        let value = u64::try_from(value).map_err(de::Error::custom)?;
        T::try_from(value).map_err(de::Error::custom)
    }

    fn visit_f64<E>(self, value: f64) -> Result<T, E>
    where
        E: de::Error,
    {
        if value.fract() == 0.0 && value >= 0.0 && value <= u64::MAX as f64 {
            T::try_from(value as u64).map_err(de::Error::custom)
        } else {
            Err(de::Error::custom(format!(
                "Expecting unsigned integer, but got {value}"
            )))
        }
    }
}

// This function is inspired by https://serde.rs/string-or-struct.html
pub(crate) fn u64_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(IntegerOrString::<u64>(PhantomData))
}

pub(crate) fn option_u64_or_string<'de, D>(
    deserializer: D,
) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    option_integer_or_string::<D, u64>(deserializer)
}

pub(crate) fn option_u32_or_string<'de, D>(
    deserializer: D,
) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    option_integer_or_string::<D, u32>(deserializer)
}

pub(crate) fn option_u16_or_string<'de, D>(
    deserializer: D,
) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    option_integer_or_string::<D, u16>(deserializer)
}

pub(crate) fn option_u8_or_string<'de, D>(
    deserializer: D,
) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    option_integer_or_string::<D, u8>(deserializer)
}

fn option_integer_or_string<'de, D, T>(
    deserializer: D,
) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
    <T as TryFrom<u64>>::Error: std::fmt::Display,
{
    struct OptionalInteger<T>(PhantomData<fn() -> T>);

    impl<'de, T> Visitor<'de> for OptionalInteger<T>
    where
        T: TryFrom<u64>,
        <T as TryFrom<u64>>::Error: std::fmt::Display,
    {
        type Value = Option<T>;

        fn expecting(
            &self,
            formatter: &mut std::fmt::Formatter,
        ) -> std::fmt::Result {
            formatter.write_str("null, unsigned integer or string")
        }

        fn visit_none<E>(self) -> Result<Option<T>, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Option<T>, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Option<T>, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer
                .deserialize_any(IntegerOrString::<T>(PhantomData))
                .map(Some)
        }

        fn visit_str<E>(self, value: &str) -> Result<Option<T>, E>
        where
            E: de::Error,
        {
            IntegerOrString::<T>(PhantomData).visit_str(value).map(Some)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Option<T>, E>
        where
            E: de::Error,
        {
            IntegerOrString::<T>(PhantomData).visit_u64(value).map(Some)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Option<T>, E>
        where
            E: de::Error,
        {
            IntegerOrString::<T>(PhantomData).visit_i64(value).map(Some)
        }

        fn visit_f64<E>(self, value: f64) -> Result<Option<T>, E>
        where
            E: de::Error,
        {
            IntegerOrString::<T>(PhantomData).visit_f64(value).map(Some)
        }
    }

    deserializer.deserialize_option(OptionalInteger::<T>(PhantomData))
}

// Identifiers such as dpid, port number and MAC may arrive as either JSON
// strings or numbers, they are always kept as string.
pub(crate) fn string_or_number<'de, D>(
    deserializer: D,
) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrNumber;

    impl<'de> Visitor<'de> for StringOrNumber {
        type Value = String;

        fn expecting(
            &self,
            formatter: &mut std::fmt::Formatter,
        ) -> std::fmt::Result {
            formatter.write_str("string or number")
        }

        fn visit_str<E>(self, value: &str) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_string<E>(self, value: String) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}

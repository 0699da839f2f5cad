use std::{fmt::Display, str::FromStr};

use anyhow::bail;
use configparser::ini::Ini;

use crate::error::Error;

pub struct IniLoader {
    pub ini: Ini,
}

impl IniLoader {
    pub fn new(config_file: &str) -> anyhow::Result<Self> {
        let mut ini = Ini::new();
        if let Err(e) = ini.load(config_file) {
            bail!(Error::ConfigError(format!(
                "failed to load config file: [{}], error: {}",
                config_file, e
            )))
        }
        Ok(Self { ini })
    }

    pub fn from_content(content: &str) -> anyhow::Result<Self> {
        let mut ini = Ini::new();
        if let Err(e) = ini.read(content.to_string()) {
            bail!(Error::ConfigError(format!(
                "failed to parse config content, error: {}",
                e
            )))
        }
        Ok(Self { ini })
    }

    pub fn contains(&self, section: &str, key: &str) -> bool {
        self.get_raw(section, key).is_some()
    }

    pub fn contains_section(&self, section: &str) -> bool {
        self.ini.sections().contains(&section.to_string())
    }

    pub fn get_required<T>(&self, section: &str, key: &str) -> anyhow::Result<T>
    where
        T: FromStr,
        <T as FromStr>::Err: Display,
    {
        match self.get_raw(section, key) {
            Some(value) => Self::parse(section, key, &value),
            None => bail!(Error::ConfigError(format!(
                "config [{}].{} does not exist",
                section, key
            ))),
        }
    }

    pub fn get_optional<T>(&self, section: &str, key: &str) -> anyhow::Result<T>
    where
        T: FromStr + Default,
        <T as FromStr>::Err: Display,
    {
        self.get_with_default(section, key, T::default())
    }

    pub fn get_with_default<T>(&self, section: &str, key: &str, default: T) -> anyhow::Result<T>
    where
        T: FromStr,
        <T as FromStr>::Err: Display,
    {
        match self.get_raw(section, key) {
            Some(value) => Self::parse(section, key, &value),
            None => Ok(default),
        }
    }

    fn get_raw(&self, section: &str, key: &str) -> Option<String> {
        self.ini
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(section: &str, key: &str, value: &str) -> anyhow::Result<T>
    where
        T: FromStr,
        <T as FromStr>::Err: Display,
    {
        match value.parse::<T>() {
            Ok(v) => Ok(v),
            Err(e) => bail!(Error::ConfigError(format!(
                "config [{}].{}={} parse failed: {}",
                section, key, value, e
            ))),
        }
    }
}

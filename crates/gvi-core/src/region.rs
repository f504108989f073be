//! Market regions that partition otherwise-identical snapshot data.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator as _, IntoStaticStr};

use crate::Error;

/// One of the fixed set of region labels a snapshot can be tagged with.
///
/// The display form is the label stored in the database and printed in
/// reports. Parsing is ASCII case-insensitive.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Display, EnumString,
  EnumIter, IntoStaticStr,
)]
#[strum(ascii_case_insensitive, parse_err_ty = Error, parse_err_fn = unknown_region)]
pub enum Region {
  #[default]
  #[strum(to_string = "US")]
  Us,
  #[strum(to_string = "Europe (excl UK)")]
  EuropeExUk,
  #[strum(to_string = "UK")]
  Uk,
  #[strum(to_string = "APAC (excl. Japan)", serialize = "APAC (excl Japan)")]
  ApacExJapan,
  #[strum(to_string = "Japan")]
  Japan,
  #[strum(to_string = "China")]
  China,
  #[strum(to_string = "Global")]
  Global,
  #[strum(to_string = "Emerging Markets")]
  EmergingMarkets,
}

fn unknown_region(s: &str) -> Error { Error::UnknownRegion(s.to_owned()) }

impl Region {
  /// Every region label, in declaration order.
  pub fn all() -> impl Iterator<Item = Region> { Region::iter() }

  pub fn label(self) -> &'static str { self.into() }
}

impl Serialize for Region {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.label())
  }
}

impl<'de> Deserialize<'de> for Region {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    Region::from_str(&s).map_err(serde::de::Error::custom)
  }
}

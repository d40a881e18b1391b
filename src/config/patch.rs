//! Tri-state field patches for sparse configuration layers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One field of a sparse configuration layer.
///
/// * `Absent`: the layer says nothing; lower layers show through.
/// * `Clear`: the layer explicitly removes the value (JSON `null`).
/// * `Set`: the layer replaces the value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Absent,
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    /// `Some` sets, `None` leaves the field untouched.
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Set)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            _ => None,
        }
    }
}

impl<T: Clone> Patch<T> {
    /// Combine with a higher-precedence patch for the same field.
    pub fn overlay(&self, upper: &Self) -> Self {
        match upper {
            Self::Absent => self.clone(),
            other => other.clone(),
        }
    }

    /// Apply to an optional target; `Clear` empties it.
    pub fn apply_option(&self, target: &mut Option<T>) {
        match self {
            Self::Absent => {}
            Self::Clear => *target = None,
            Self::Set(value) => *target = Some(value.clone()),
        }
    }

    /// Apply to a required target; `Clear` restores `default`.
    pub fn apply_value(&self, target: &mut T, default: T) {
        match self {
            Self::Absent => {}
            Self::Clear => *target = default,
            Self::Set(value) => *target = value.clone(),
        }
    }

    /// Turn `Absent` into `Clear`.
    pub(crate) fn or_clear(&self) -> Self {
        match self {
            Self::Absent => Self::Clear,
            other => other.clone(),
        }
    }
}

impl<T> From<T> for Patch<T> {
    fn from(value: T) -> Self {
        Self::Set(value)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Set(value) => value.serialize(serializer),
            Self::Absent | Self::Clear => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Self::Set(value),
            None => Self::Clear,
        })
    }
}

/// A sparse layer for a nested plain-object field.
pub trait Overlay: Clone {
    type Target;

    /// Write every non-absent field into `target`.
    fn apply_to(&self, target: &mut Self::Target);

    /// Combine with a higher-precedence layer, field by field.
    fn overlay(&self, upper: &Self) -> Self;

    /// This layer as it would act on a freshly cleared object.
    fn on_cleared(&self) -> Self;
}

impl<P: Overlay> Patch<P> {
    /// Deep-merge a nested layer into `target`; `Clear` restores `default`.
    pub fn apply_nested(&self, target: &mut P::Target, default: P::Target) {
        match self {
            Self::Absent => {}
            Self::Clear => *target = default,
            Self::Set(layer) => layer.apply_to(target),
        }
    }

    /// Combine nested patches so that applying the result equals applying
    /// `self` then `upper`.
    pub fn overlay_nested(&self, upper: &Self) -> Self {
        match (self, upper) {
            (lower, Self::Absent) => lower.clone(),
            (_, Self::Clear) => Self::Clear,
            (Self::Absent, Self::Set(b)) => Self::Set(b.clone()),
            (Self::Clear, Self::Set(b)) => Self::Set(b.on_cleared()),
            (Self::Set(a), Self::Set(b)) => Self::Set(a.overlay(b)),
        }
    }
}

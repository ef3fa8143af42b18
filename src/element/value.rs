use crate::types::{Date, Version};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses an attribute's raw text into a typed value.
pub trait FromAttrib: Sized {
    /// `None` means the text does not hold a value of this type.
    fn from_attrib(raw: &str) -> Option<Self>;
}

/// Formats a typed value as attribute text.
pub trait ToAttrib {
    /// Attribute text for this value.
    fn to_attrib(&self) -> String;
}

impl<T: ToAttrib + ?Sized> ToAttrib for &T {
    fn to_attrib(&self) -> String {
        (**self).to_attrib()
    }
}

impl FromAttrib for String {
    fn from_attrib(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl ToAttrib for str {
    fn to_attrib(&self) -> String {
        self.to_string()
    }
}

impl ToAttrib for String {
    fn to_attrib(&self) -> String {
        self.clone()
    }
}

impl FromAttrib for bool {
    fn from_attrib(raw: &str) -> Option<Self> {
        match raw {
            "y" => Some(true),
            "n" => Some(false),
            _ => None,
        }
    }
}

impl ToAttrib for bool {
    fn to_attrib(&self) -> String {
        if *self { "y" } else { "n" }.to_string()
    }
}

macro_rules! numeric_attrib {
    ($($ty:ty),*) => {
        $(
            impl FromAttrib for $ty {
                fn from_attrib(raw: &str) -> Option<Self> {
                    raw.trim().parse().ok()
                }
            }

            impl ToAttrib for $ty {
                fn to_attrib(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

numeric_attrib!(i16, i32, i64, u16, u32, f64);

impl FromAttrib for Date {
    fn from_attrib(raw: &str) -> Option<Self> {
        Date::parse_from_str(raw.trim(), DATE_FORMAT).ok()
    }
}

impl ToAttrib for Date {
    fn to_attrib(&self) -> String {
        self.format(DATE_FORMAT).to_string()
    }
}

impl FromAttrib for Version {
    fn from_attrib(raw: &str) -> Option<Self> {
        Version::parse_strict(raw)
    }
}

impl ToAttrib for Version {
    fn to_attrib(&self) -> String {
        self.to_string()
    }
}

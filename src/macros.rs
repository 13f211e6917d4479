// Copyright 2024 Dmitry Tantsur <dtantsur@protonmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Useful macros for defining protocol structures.

/// A macro for defining extensible protocol enumerations.
///
/// OpenStack services routinely grow new values for string-typed fields via
/// vendor extensions. An enumeration defined with this macro deserializes
/// known values into typed variants, while an unknown value is *preserved* in
/// the catch-all variant and serialized back unchanged.
///
/// `Clone`, `Debug`, equality traits, `Display`, string conversions and
/// `Serialize`/`Deserialize` are derived automatically:
///
/// ```rust
/// osclients::extensible_enum! {
///     #[doc = "Possible network statuses."]
///     pub enum NetworkStatus: Other {
///         Active = "ACTIVE",
///         Down = "DOWN",
///         Building = "BUILD",
///         Error = "ERROR"
///     }
/// }
///
/// let status: NetworkStatus = serde_json::from_str("\"SNAPSHOTTING\"").unwrap();
/// assert_eq!(status, NetworkStatus::Other("SNAPSHOTTING".into()));
/// assert_eq!(serde_json::to_string(&status).unwrap(), "\"SNAPSHOTTING\"");
/// ```
#[macro_export]
macro_rules! extensible_enum {
    {$(#[$attr:meta])* $v:vis enum $name:ident: $other:ident {
        $($(#[$iattr:meta])* $item:ident = $val:literal),+ $(,)?
    }} => (
        $(#[$attr])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        #[non_exhaustive]
        $v enum $name {
            $($(#[$iattr])* $item,)+
            /// A value that is not (yet) known to this crate.
            $other(String),
        }

        impl $name {
            /// The wire representation of this value.
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$item => $val,)+
                    $name::$other(inner) => inner,
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> $name {
                match value.as_str() {
                    $($val => $name::$item,)+
                    _ => $name::$other(value),
                }
            }
        }

        impl<'s> From<&'s str> for $name {
            fn from(value: &'s str) -> $name {
                $name::from(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                match value {
                    $name::$other(inner) => inner,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::serde::ser::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
                    where S: ::serde::ser::Serializer {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::de::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
                    where D: ::serde::de::Deserializer<'de> {
                let value: String = ::serde::de::Deserialize::deserialize(deserializer)?;
                Ok($name::from(value))
            }
        }
    );
}

#[cfg(test)]
pub mod test {
    crate::extensible_enum! {
        #[doc = "Statuses used in tests."]
        pub enum TestStatus: Other {
            Active = "ACTIVE",
            Down = "DOWN"
        }
    }

    #[test]
    fn test_known_value() {
        let status: TestStatus = serde_json::from_str("\"ACTIVE\"").unwrap();
        assert_eq!(status, TestStatus::Active);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"ACTIVE\"");
        assert_eq!(status.as_str(), "ACTIVE");
    }

    #[test]
    fn test_unknown_value_preserved() {
        let status: TestStatus = serde_json::from_str("\"PENDING_UPDATE\"").unwrap();
        assert_eq!(status, TestStatus::Other("PENDING_UPDATE".to_string()));
        assert_eq!(
            serde_json::to_string(&status).unwrap(),
            "\"PENDING_UPDATE\""
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!(TestStatus::from("DOWN"), TestStatus::Down);
        assert_eq!(
            TestStatus::from("WAT"),
            TestStatus::Other("WAT".to_string())
        );
        assert_eq!(String::from(TestStatus::Down), "DOWN");
    }

    #[test]
    fn test_display() {
        assert_eq!(TestStatus::Active.to_string(), "ACTIVE");
        assert_eq!(TestStatus::Other("X".to_string()).to_string(), "X");
    }
}

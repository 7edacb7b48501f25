macro_rules! enum_sim {
    (
        $(#[$enum_attr: meta])*
        pub struct $tname:ident ($size_t:ty) {
            $(
                $(#[$arm_attr: meta])*
                $enum_arm:ident = $num_exp:expr
            ),+ $(,)?
        }
    ) => {
        #[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
        $(#[$enum_attr])*
        pub struct $tname($size_t);

        impl $tname {
            $(
                $(#[$arm_attr])*
                pub const $enum_arm: Self = Self($num_exp);
            )+

            /// Get the raw value.
            pub fn raw(&self) -> $size_t {
                self.0
            }
        }

        impl ::core::convert::From<$size_t> for $tname {
            #[inline]
            fn from(value: $size_t) -> $tname {
                $tname(value)
            }
        }

        impl ::core::convert::From<$tname> for $size_t {
            #[inline]
            fn from(value: $tname) -> $size_t {
                value.0
            }
        }
    };
}

// Generates a fieldless state enum for one of the bridge automata together
// with its state count and printable names.
macro_rules! sm_states {
    (
        $(#[$enum_attr: meta])*
        pub(crate) enum $tname:ident {
            $($state:ident => $name:literal),+ $(,)?
        }
    ) => {
        $(#[$enum_attr])*
        #[derive(Debug, PartialEq, Eq, Clone, Copy)]
        pub(crate) enum $tname {
            $($state),+
        }

        impl $tname {
            pub(crate) const COUNT: usize = [$($name),+].len();

            pub(crate) fn name(&self) -> &'static str {
                match self {
                    $(Self::$state => $name),+
                }
            }
        }
    };
}

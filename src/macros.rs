pub use enclose::*;

#[macro_export]
macro_rules! computed {
	($record:expr, $name:expr, [ $($dep:expr),+ $(,)? ], ( $($d_tt:tt)* ) $obj:ident => $($b:tt)*) => {
		$crate::computed_property(
			$record,
			$name,
			[$( $dep ),+].into_iter().collect::<$crate::Dependencies>(),
			$crate::Property::getter($crate::macros::enclose!(( $($d_tt)* ) move |$obj: &$crate::Record| { $($b)* })),
		)
	};
	($record:expr, $name:expr, [ $($dep:expr),+ $(,)? ], $obj:ident => $($b:tt)*) => {
		$crate::computed_property(
			$record,
			$name,
			[$( $dep ),+].into_iter().collect::<$crate::Dependencies>(),
			$crate::Property::getter(move |$obj: &$crate::Record| { $($b)* }),
		)
	};
}

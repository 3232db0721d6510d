/// Declares a concrete type as a component.
///
/// Emits a static [`ComponentDef`](crate::ComponentDef) for the type, submits
/// it for link-time collection into the global registry, and implements
/// [`Component`](crate::Component) and
/// [`RegisteredComponent`](crate::RegisteredComponent).
///
/// The constructor expression must have the signature
/// `fn(&ComponentManager) -> Result<Self, E>` for some `E` convertible into
/// [`BoxError`](crate::BoxError). Each entry in `implements` is the trait
/// object type of an interface, e.g. `dyn ITaxProvider`.
#[macro_export]
macro_rules! component {
	(
		$ty:ident, $name:literal,
		new = $ctor:expr,
		implements = [$($iface:ty),* $(,)?] $(,)?
	) => {
		$crate::__private::paste! {
			const [<__GIRDER_BINDINGS_ $ty:snake:upper>]: &[$crate::InterfaceBinding] = &[
				$(
					$crate::InterfaceBinding {
						interface: || ::std::any::TypeId::of::<$iface>(),
						interface_name: ::std::stringify!($iface),
						cast: |component| {
							let concrete = $crate::Component::as_any_arc(component)
								.downcast::<$ty>()
								.expect("interface cast invoked with a foreign component");
							let arc: ::std::sync::Arc<$iface> = concrete;
							::std::boxed::Box::new(arc)
						},
					},
				)*
			];

			static [<__GIRDER_COMPONENT_ $ty:snake:upper>]: $crate::ComponentDef =
				$crate::ComponentDef {
					name: $name,
					type_id: || ::std::any::TypeId::of::<$ty>(),
					ctor: |manager| {
						let component: $ty = ($ctor)(manager)?;
						::std::result::Result::Ok(
							::std::sync::Arc::new(component)
								as ::std::sync::Arc<dyn $crate::Component>,
						)
					},
					implements: [<__GIRDER_BINDINGS_ $ty:snake:upper>],
				};

			impl $crate::Component for $ty {
				fn as_any_arc(
					self: ::std::sync::Arc<Self>,
				) -> ::std::sync::Arc<dyn ::std::any::Any + Send + Sync> {
					self
				}
			}

			impl $crate::RegisteredComponent for $ty {
				fn def() -> &'static $crate::ComponentDef {
					&[<__GIRDER_COMPONENT_ $ty:snake:upper>]
				}
			}

			$crate::__private::inventory::submit! {
				$crate::ComponentReg(&[<__GIRDER_COMPONENT_ $ty:snake:upper>])
			}
		}
	};
}

//! Macro for reducing boilerplate when defining entities
//!
//! [`impl_queryable_entity!`](crate::impl_queryable_entity) generates the
//! struct, the base fields every record carries, the `Entity` and
//! `Queryable` implementations and the cached accessor table.

/// Complete macro to create an entity with automatic trait implementations
///
/// Generates:
/// - the struct with `id`, `created_at`, `updated_at` and the listed fields
/// - an accessor table cached in a `OnceLock`, where the base fields are
///   read-only and every listed field is readable and writable
/// - `Entity` and `Queryable` implementations
/// - a `new()` constructor taking the listed fields in order
///
/// Field types must implement [`FieldType`](crate::core::field::FieldType).
/// The bracketed list names the properties free-text search looks at.
///
/// # Example
///
/// ```rust,ignore
/// use registrar::prelude::*;
///
/// impl_queryable_entity!(
///     Course,
///     "course",
///     ["title", "code"],
///     {
///         title: String,
///         code: String,
///         credits: i32,
///         archived_at: Option<DateTime<Utc>>,
///     }
/// );
///
/// let course = Course::new("Algebra I".to_string(), "MATH-101".to_string(), 5, None);
/// ```
#[macro_export]
macro_rules! impl_queryable_entity {
    (
        $type:ident,
        $type_name:expr,
        [ $( $searchable:expr ),* $(,)? ],
        {
            $( $field:ident : $field_type:ty ),* $(,)?
        }
    ) => {
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $type {
            /// Unique identifier for this entity
            pub id: ::uuid::Uuid,

            /// When this entity was created
            pub created_at: ::chrono::DateTime<::chrono::Utc>,

            /// When this entity was last updated
            pub updated_at: ::chrono::DateTime<::chrono::Utc>,

            $( pub $field : $field_type ),*
        }

        impl $crate::core::entity::Queryable for $type {
            fn schema() -> &'static $crate::core::schema::EntitySchema<Self> {
                use $crate::core::field::FieldType;
                static SCHEMA: ::std::sync::OnceLock<$crate::core::schema::EntitySchema<$type>> =
                    ::std::sync::OnceLock::new();

                SCHEMA.get_or_init(|| {
                    $crate::core::schema::EntitySchema::<$type>::builder($type_name)
                        .field::<::uuid::Uuid>("id", |e| e.id.to_field_value())
                        .field::<::chrono::DateTime<::chrono::Utc>>("created_at", |e| {
                            e.created_at.to_field_value()
                        })
                        .field::<::chrono::DateTime<::chrono::Utc>>("updated_at", |e| {
                            e.updated_at.to_field_value()
                        })
                        $(
                            .writable::<$field_type>(
                                stringify!($field),
                                |e| e.$field.to_field_value(),
                                |e, value| {
                                    e.$field = <$field_type as FieldType>::from_field_value(value.clone())
                                        .ok_or(value)?;
                                    Ok(())
                                },
                            )
                        )*
                        .searchable(&[ $( $searchable ),* ])
                        .build()
                        .unwrap_or_else(|e| panic!("invalid entity declaration: {}", e))
                })
            }
        }

        impl $crate::core::entity::Entity for $type {
            fn id(&self) -> ::uuid::Uuid {
                self.id
            }

            fn created_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.created_at
            }

            fn updated_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.updated_at
            }

            fn adopt_identity(
                &mut self,
                id: ::uuid::Uuid,
                created_at: ::chrono::DateTime<::chrono::Utc>,
            ) {
                self.id = id;
                self.created_at = created_at;
            }

            fn touch(&mut self) {
                self.updated_at = ::chrono::Utc::now();
            }
        }

        impl $type {
            /// Create a new instance of this entity
            #[allow(clippy::too_many_arguments)]
            pub fn new($( $field: $field_type ),*) -> Self {
                let now = ::chrono::Utc::now();
                Self {
                    id: ::uuid::Uuid::new_v4(),
                    created_at: now,
                    updated_at: now,
                    $( $field ),*
                }
            }
        }
    };
}

/// Generates one instrumented method per store request variant, named after the
/// variant in snake case (`GetItem` becomes `get_item`).
macro_rules! store_methods {
    ($handle:ty => $($variant:ident { $($param:ident: $param_type:ty),* } -> $return_type:ty;)+) => {
        paste::paste! {
            impl $handle {
                $(
                    #[tracing::instrument(skip(self))]
                    pub async fn [<$variant:snake>](&self, $($param: $param_type),*) -> Result<$return_type, $crate::error::StoreError> {
                        tracing::debug!("Sending request");
                        $crate::store::call(self, |respond_to| $crate::store::StoreRequest::$variant {
                            $($param,)*
                            respond_to,
                        })
                        .await
                    }
                )+
            }
        }
    };
}

/// The full request surface, shared by autocommit handles and units of work.
macro_rules! impl_store_api {
    ($handle:ty) => {
        store_methods!($handle =>
            GetItem { id: $crate::domain::ItemId } -> $crate::domain::Item;
            CreateItem { params: $crate::domain::ItemCreate } -> $crate::domain::ItemId;
            UpdateItem { id: $crate::domain::ItemId, patch: $crate::domain::ItemPatch } -> $crate::domain::Item;
            AdjustQuantity { id: $crate::domain::ItemId, delta: i64 } -> ();
            InsertOrder { params: $crate::domain::OrderCreate } -> $crate::domain::OrderId;
            InsertOrderLine { params: $crate::domain::OrderLineCreate } -> ();
            GetOrder { id: $crate::domain::OrderId } -> Option<$crate::domain::OrderView>;
            ListOrders { owner: Option<$crate::domain::PrincipalId> } -> Vec<$crate::domain::OrderView>;
        );
    };
}

pub mod map;

mod slab;

pub use map::RBTreeMap;

#[macro_export(local_inner_macros)]
macro_rules! rbmap {
    (@single $($x:tt)*) => (());
    (@count $($rest:expr),*) => (<[()]>::len(&[$(rbmap!(@single $rest)),*]));

    // trailing comma case
    ($($key:expr => $value:expr,)+) => (rbmap!($($key => $value),+));

    ( $($key:expr => $value:expr),* ) => {
        {
            let _cap = rbmap!(@count $($key),*);
            let mut _map = $crate::RBTreeMap::with_capacity(_cap);
            $(
                _map.insert($key, $value);
            )*
            _map
        }
    };
}

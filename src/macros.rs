/// Construct a [`Value`][crate::Value] model using JSON-like syntax.
///
/// Map keys may be identifiers or string literals, the latter for keys that
/// are not valid identifiers such as `"first-name"`. The outer braces can be
/// omitted for a top level map.
///
/// ```
/// let model = weft::value! {
///     title: "Fruit",
///     "in-stock": true,
///     items: [{ name: "Apple" }, { name: "Pear", price: 3 }],
///     note: None,
/// };
/// ```
#[macro_export]
macro_rules! value {
    () => {
        $crate::_value!({})
    };
    ($key:tt : $($rest:tt)*) => {
        $crate::_value!({ $key : $($rest)* })
    };
    ($($tt:tt)+) => {
        $crate::_value!($($tt)+)
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! _value {
    // Munches the inside of a list, accumulating finished elements.
    (@list [$($elems:expr,)*]) => {
        ::std::vec![$($elems,)*]
    };
    (@list [$($elems:expr,)*] , $($rest:tt)*) => {
        $crate::_value!(@list [$($elems,)*] $($rest)*)
    };
    (@list [$($elems:expr,)*] None $($rest:tt)*) => {
        $crate::_value!(@list [$($elems,)* $crate::Value::None,] $($rest)*)
    };
    (@list [$($elems:expr,)*] [$($list:tt)*] $($rest:tt)*) => {
        $crate::_value!(@list [$($elems,)* $crate::_value!([$($list)*]),] $($rest)*)
    };
    (@list [$($elems:expr,)*] {$($map:tt)*} $($rest:tt)*) => {
        $crate::_value!(@list [$($elems,)* $crate::_value!({$($map)*}),] $($rest)*)
    };
    (@list [$($elems:expr,)*] $next:expr , $($rest:tt)*) => {
        $crate::_value!(@list [$($elems,)* $crate::Value::from($next),] $($rest)*)
    };
    (@list [$($elems:expr,)*] $last:expr) => {
        $crate::_value!(@list [$($elems,)* $crate::Value::from($last),])
    };

    // Munches the inside of a map, inserting each entry into `$map`.
    (@map $map:ident) => {};
    (@map $map:ident , $($rest:tt)*) => {
        $crate::_value!(@map $map $($rest)*);
    };
    (@map $map:ident $key:tt : None $($rest:tt)*) => {
        let _ = $map.insert($crate::_value_key!($key), $crate::Value::None);
        $crate::_value!(@map $map $($rest)*);
    };
    (@map $map:ident $key:tt : [$($list:tt)*] $($rest:tt)*) => {
        let _ = $map.insert($crate::_value_key!($key), $crate::_value!([$($list)*]));
        $crate::_value!(@map $map $($rest)*);
    };
    (@map $map:ident $key:tt : {$($inner:tt)*} $($rest:tt)*) => {
        let _ = $map.insert($crate::_value_key!($key), $crate::_value!({$($inner)*}));
        $crate::_value!(@map $map $($rest)*);
    };
    (@map $map:ident $key:tt : $value:expr , $($rest:tt)*) => {
        let _ = $map.insert($crate::_value_key!($key), $crate::Value::from($value));
        $crate::_value!(@map $map $($rest)*);
    };
    (@map $map:ident $key:tt : $value:expr) => {
        let _ = $map.insert($crate::_value_key!($key), $crate::Value::from($value));
    };

    (None) => {
        $crate::Value::None
    };
    ([]) => {
        $crate::Value::List($crate::List::new())
    };
    ([ $($tt:tt)+ ]) => {
        $crate::Value::List($crate::_value!(@list [] $($tt)+))
    };
    ({}) => {
        $crate::Value::Map($crate::Map::new())
    };
    ({ $($tt:tt)+ }) => {
        $crate::Value::Map({
            let mut map = $crate::Map::new();
            $crate::_value!(@map map $($tt)+);
            map
        })
    };
    ($other:expr) => {
        $crate::Value::from($other)
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! _value_key {
    ($key:ident) => {
        ::std::string::String::from(::std::stringify!($key))
    };
    ($key:literal) => {
        ::std::string::String::from($key)
    };
}

// Like assert!, but checks a pattern.
//
//   assert_match!(Some(_) = x);
#[allow(unused_macros)]
macro_rules! assert_match {
    ( $error:pat = $expr:expr ) => {{
        let x = $expr;
        if let $error = x {
            /* Pass. */
        } else {
            panic!("Expected {}, got {:?}", stringify!($error), x);
        }
    }};
}

// Statically asserts that a type is `Send + Sync`, so that callers
// across threads (e.g. behind an `Arc`) don't discover a missing
// bound at a distance.
macro_rules! assert_send_and_sync {
    ($x:ty where $($g:ident: $bound:path),*) => {
        const _: fn() = || {
            fn assert_send_and_sync<$($g),*>()
                where $($g: $bound + Send + Sync),*
            {
                fn check<T: ?Sized + Send + Sync>() {}
                check::<$x>();
            }
        };
    };
    ($x:ty) => {
        const _: fn() = || {
            fn check<T: ?Sized + Send + Sync>() {}
            check::<$x>();
        };
    };
}

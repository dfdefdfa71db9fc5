use std::cell::RefCell;
use std::error::Error as _;
use std::ffi::CStr;
use std::mem;
use std::os::raw::c_char;
use std::panic;
use std::ptr;
use std::slice;
use std::str;
use std::thread;

use thiserror::Error;

use crate::errors::SketchErrorCode;
use crate::Error;

thread_local! {
    pub static LAST_ERROR: RefCell<Option<Error>> = RefCell::new(None);
}

/// Marshalling helpers between opaque FFI handles and the Rust objects
/// behind them.
#[allow(clippy::wrong_self_convention)]
pub trait ForeignObject: Sized {
    type RustObject;

    #[inline]
    unsafe fn from_rust(object: Self::RustObject) -> *mut Self {
        Box::into_raw(Box::new(object)) as *mut Self
    }

    #[inline]
    unsafe fn from_ref(object: &Self::RustObject) -> *const Self {
        object as *const Self::RustObject as *const Self
    }

    #[inline]
    unsafe fn as_rust<'a>(pointer: *const Self) -> &'a Self::RustObject {
        &*(pointer as *const Self::RustObject)
    }

    #[inline]
    unsafe fn as_rust_mut<'a>(pointer: *mut Self) -> &'a mut Self::RustObject {
        &mut *(pointer as *mut Self::RustObject)
    }

    #[inline]
    unsafe fn into_rust(pointer: *mut Self) -> Box<Self::RustObject> {
        Box::from_raw(pointer as *mut Self::RustObject)
    }

    #[inline]
    unsafe fn drop(pointer: *mut Self) {
        if !pointer.is_null() {
            drop(Self::into_rust(pointer));
        }
    }
}

macro_rules! ffi_fn {
    // a function that catches panics and returns a result (err goes to tls)
    (
        $(#[$attr:meta])*
        unsafe fn $name:ident($($aname:ident: $aty:ty),* $(,)*) -> Result<$rv:ty> $body:block
    ) => {
        #[no_mangle]
        $(#[$attr])*
        pub unsafe extern "C" fn $name($($aname: $aty,)*) -> $rv {
            $crate::ffi::utils::landingpad(|| $body)
        }
    };

    // a function that catches panics and returns nothing (err goes to tls)
    (
        $(#[$attr:meta])*
        unsafe fn $name:ident($($aname:ident: $aty:ty),* $(,)*) $body:block
    ) => {
        #[no_mangle]
        $(#[$attr])*
        pub unsafe extern "C" fn $name($($aname: $aty,)*) {
            // this silences panics and stuff
            $crate::ffi::utils::landingpad(|| { $body; Ok(0 as std::os::raw::c_int) });
        }
    };
}

/// An error raised in place of panics caught at the FFI boundary.
#[derive(Debug, Error)]
#[error("kmersketch panicked: {0}")]
pub struct Panic(String);

fn set_last_error(err: Error) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = Some(err);
    });
}

pub unsafe fn set_panic_hook() {
    panic::set_hook(Box::new(|info| {
        let thread = thread::current();
        let thread = thread.name().unwrap_or("unnamed");

        let message = match info.payload().downcast_ref::<&str>() {
            Some(s) => *s,
            None => match info.payload().downcast_ref::<String>() {
                Some(s) => &**s,
                None => "Box<Any>",
            },
        };

        let description = match info.location() {
            Some(location) => format!(
                "thread '{}' panicked with '{}' at {}:{}",
                thread,
                message,
                location.file(),
                location.line()
            ),
            None => format!("thread '{}' panicked with '{}'", thread, message),
        };

        set_last_error(Panic(description).into())
    }));
}

pub unsafe fn landingpad<F, T>(f: F) -> T
where
    F: FnOnce() -> Result<T, Error> + panic::UnwindSafe,
{
    match panic::catch_unwind(f) {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => {
            set_last_error(err);
            mem::zeroed()
        }
        Err(_) => mem::zeroed(),
    }
}

/// Initializes the library.
#[no_mangle]
pub unsafe extern "C" fn kmersketch_init() {
    set_panic_hook();
}

/// Returns the last error code, or 0 if there is no error.
#[no_mangle]
pub unsafe extern "C" fn kmersketch_err_get_last_code() -> SketchErrorCode {
    LAST_ERROR.with(|e| {
        if let Some(ref err) = *e.borrow() {
            SketchErrorCode::from_error(err)
        } else {
            SketchErrorCode::NoError
        }
    })
}

/// Returns the last error message.
///
/// If there is no error an empty string is returned. This allocates new
/// memory that needs to be freed with `kmersketch_str_free`.
#[no_mangle]
pub unsafe extern "C" fn kmersketch_err_get_last_message() -> SketchStr {
    use std::fmt::Write;
    LAST_ERROR.with(|e| {
        if let Some(ref err) = *e.borrow() {
            let mut msg = err.to_string();
            let mut source = err.source();
            while let Some(cause) = source {
                write!(&mut msg, "\n  caused by: {}", cause).ok();
                source = cause.source();
            }
            SketchStr::from_string(msg)
        } else {
            Default::default()
        }
    })
}

/// Clears the last error.
#[no_mangle]
pub unsafe extern "C" fn kmersketch_err_clear() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Represents a string over the FFI, with an ownership flag telling the
/// receiver whether it must be released with `kmersketch_str_free`.
#[repr(C)]
pub struct SketchStr {
    pub data: *mut c_char,
    pub len: usize,
    pub owned: bool,
}

impl Default for SketchStr {
    fn default() -> SketchStr {
        SketchStr {
            data: ptr::null_mut(),
            len: 0,
            owned: false,
        }
    }
}

impl From<String> for SketchStr {
    fn from(s: String) -> SketchStr {
        SketchStr::from_string(s)
    }
}

impl SketchStr {
    pub fn new(s: &str) -> SketchStr {
        SketchStr {
            data: s.as_ptr() as *mut c_char,
            len: s.len(),
            owned: false,
        }
    }

    pub fn from_string(mut s: String) -> SketchStr {
        s.shrink_to_fit();
        let rv = SketchStr {
            data: s.as_ptr() as *mut c_char,
            len: s.len(),
            owned: true,
        };
        mem::forget(s);
        rv
    }

    pub unsafe fn free(&mut self) {
        if self.owned {
            drop(String::from_raw_parts(self.data as *mut _, self.len, self.len));
            self.data = ptr::null_mut();
            self.len = 0;
            self.owned = false;
        }
    }

    pub fn as_str(&self) -> &str {
        unsafe { str::from_utf8_unchecked(slice::from_raw_parts(self.data as *const _, self.len)) }
    }
}

ffi_fn! {
    /// Creates a kmersketch str from a C string.
    ///
    /// This sets the string to owned. In case it's not owned you either
    /// have to make sure you are not freeing the memory or you need to
    /// set the owned flag to false.
    unsafe fn kmersketch_str_from_cstr(s: *const c_char) -> Result<SketchStr> {
        let s = CStr::from_ptr(s).to_str()?;
        Ok(SketchStr {
            data: s.as_ptr() as *mut _,
            len: s.len(),
            owned: true,
        })
    }
}

/// Frees a kmersketch str.
///
/// If the string is marked as not owned then this function does not do
/// anything.
#[no_mangle]
pub unsafe extern "C" fn kmersketch_str_free(s: *mut SketchStr) {
    if !s.is_null() {
        (*s).free()
    }
}

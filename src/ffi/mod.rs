//! # Foreign Function Interface for calling kmersketch from C
//!
//! Handles are opaque pointers; every fallible call stores its error in
//! per-thread state, retrieved with `kmersketch_err_get_last_code` and
//! `kmersketch_err_get_last_message`.
#![allow(clippy::missing_safety_doc)]

#[macro_use]
pub mod utils;

pub mod cmd;
pub mod hyperloglog;
pub mod minhash;
pub mod nodegraph;
pub mod signature;

use std::ffi::CStr;
use std::os::raw::c_char;

use crate::encodings::{aa_to_dayhoff, aa_to_hp, translate_codon};
use crate::hash_murmur;

#[no_mangle]
pub unsafe extern "C" fn kmersketch_hash_murmur(kmer: *const c_char, seed: u64) -> u64 {
    let c_str = {
        assert!(!kmer.is_null());

        CStr::from_ptr(kmer)
    };

    hash_murmur(c_str.to_bytes(), seed)
}

ffi_fn! {
unsafe fn kmersketch_translate_codon(codon: *const c_char) -> Result<c_char> {
    let c_str = {
        assert!(!codon.is_null());

        CStr::from_ptr(codon)
    };

    Ok(translate_codon(c_str.to_bytes())? as c_char)
}
}

#[no_mangle]
pub unsafe extern "C" fn kmersketch_aa_to_dayhoff(aa: c_char) -> c_char {
    aa_to_dayhoff(aa as u8) as c_char
}

#[no_mangle]
pub unsafe extern "C" fn kmersketch_aa_to_hp(aa: c_char) -> c_char {
    aa_to_hp(aa as u8) as c_char
}

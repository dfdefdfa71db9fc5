use std::ffi::CStr;
use std::io;
use std::os::raw::c_char;
use std::slice;

use crate::ffi::minhash::KmersketchMinHash;
use crate::ffi::utils::ForeignObject;
use crate::signature::Sketchable;
use crate::sketch::hyperloglog::HyperLogLog;

pub struct KmersketchHyperLogLog;

impl ForeignObject for KmersketchHyperLogLog {
    type RustObject = HyperLogLog;
}

ffi_fn! {
unsafe fn hll_new(p: usize, ksize: usize) -> Result<*mut KmersketchHyperLogLog> {
    let hll = HyperLogLog::new(p, ksize)?;
    Ok(KmersketchHyperLogLog::from_rust(hll))
}
}

ffi_fn! {
unsafe fn hll_with_error_rate(error_rate: f64, ksize: usize) -> Result<*mut KmersketchHyperLogLog> {
    let hll = HyperLogLog::with_error_rate(error_rate, ksize)?;
    Ok(KmersketchHyperLogLog::from_rust(hll))
}
}

#[no_mangle]
pub unsafe extern "C" fn hll_free(ptr: *mut KmersketchHyperLogLog) {
    KmersketchHyperLogLog::drop(ptr);
}

#[no_mangle]
pub unsafe extern "C" fn hll_ksize(ptr: *const KmersketchHyperLogLog) -> usize {
    let hll = KmersketchHyperLogLog::as_rust(ptr);

    hll.ksize()
}

#[no_mangle]
pub unsafe extern "C" fn hll_cardinality(ptr: *const KmersketchHyperLogLog) -> usize {
    let hll = KmersketchHyperLogLog::as_rust(ptr);

    hll.cardinality()
}

#[no_mangle]
pub unsafe extern "C" fn hll_add_hash(ptr: *mut KmersketchHyperLogLog, hash: u64) {
    let hll = KmersketchHyperLogLog::as_rust_mut(ptr);

    hll.add_hash(hash);
}

ffi_fn! {
unsafe fn hll_add_sequence(ptr: *mut KmersketchHyperLogLog, sequence: *const c_char, insize: usize, force: bool) ->
    Result<()> {
    let hll = KmersketchHyperLogLog::as_rust_mut(ptr);
    let buf = {
        assert!(!sequence.is_null());
        slice::from_raw_parts(sequence as *mut u8, insize)
    };

    hll.add_sequence(buf, force)
}
}

ffi_fn! {
unsafe fn hll_merge(ptr: *mut KmersketchHyperLogLog, optr: *const KmersketchHyperLogLog) -> Result<()> {
    let hll = KmersketchHyperLogLog::as_rust_mut(ptr);
    let other_hll = KmersketchHyperLogLog::as_rust(optr);

    hll.merge(other_hll)
}
}

#[no_mangle]
pub unsafe extern "C" fn hll_similarity(
    ptr: *const KmersketchHyperLogLog,
    optr: *const KmersketchHyperLogLog,
) -> f64 {
    let hll = KmersketchHyperLogLog::as_rust(ptr);
    let other_hll = KmersketchHyperLogLog::as_rust(optr);

    hll.similarity(other_hll)
}

#[no_mangle]
pub unsafe extern "C" fn hll_containment(
    ptr: *const KmersketchHyperLogLog,
    optr: *const KmersketchHyperLogLog,
) -> f64 {
    let hll = KmersketchHyperLogLog::as_rust(ptr);
    let other_hll = KmersketchHyperLogLog::as_rust(optr);

    hll.containment(other_hll)
}

#[no_mangle]
pub unsafe extern "C" fn hll_intersection_size(
    ptr: *const KmersketchHyperLogLog,
    optr: *const KmersketchHyperLogLog,
) -> usize {
    let hll = KmersketchHyperLogLog::as_rust(ptr);
    let other_hll = KmersketchHyperLogLog::as_rust(optr);

    hll.intersection(other_hll)
}

#[no_mangle]
pub unsafe extern "C" fn hll_update_mh(
    ptr: *mut KmersketchHyperLogLog,
    optr: *const KmersketchMinHash,
) {
    let hll = KmersketchHyperLogLog::as_rust_mut(ptr);
    let mh = KmersketchMinHash::as_rust(optr);

    hll.update_mh(mh)
}

#[no_mangle]
pub unsafe extern "C" fn hll_matches(
    ptr: *const KmersketchHyperLogLog,
    optr: *const KmersketchMinHash,
) -> usize {
    let hll = KmersketchHyperLogLog::as_rust(ptr);
    let mh = KmersketchMinHash::as_rust(optr);

    hll.matches(mh)
}

ffi_fn! {
unsafe fn hll_from_path(filename: *const c_char) -> Result<*mut KmersketchHyperLogLog> {
    let c_str = {
        assert!(!filename.is_null());

        CStr::from_ptr(filename)
    };

    let hll = HyperLogLog::from_path(c_str.to_str()?)?;
    Ok(KmersketchHyperLogLog::from_rust(hll))
}
}

ffi_fn! {
unsafe fn hll_from_buffer(ptr: *const c_char, insize: usize) -> Result<*mut KmersketchHyperLogLog> {
    let buf = {
        assert!(!ptr.is_null());
        slice::from_raw_parts(ptr as *mut u8, insize)
    };

    let hll = HyperLogLog::from_reader(buf)?;
    Ok(KmersketchHyperLogLog::from_rust(hll))
}
}

ffi_fn! {
unsafe fn hll_save(ptr: *const KmersketchHyperLogLog, filename: *const c_char) -> Result<()> {
    let hll = KmersketchHyperLogLog::as_rust(ptr);
    let c_str = {
        assert!(!filename.is_null());

        CStr::from_ptr(filename)
    };

    hll.save(c_str.to_str()?)?;
    Ok(())
}
}

ffi_fn! {
unsafe fn hll_to_buffer(ptr: *const KmersketchHyperLogLog, size: *mut usize) -> Result<*const u8> {
    let hll = KmersketchHyperLogLog::as_rust(ptr);

    let mut buffer = vec![];
    {
        let mut writer = io::BufWriter::new(&mut buffer);
        hll.save_to_writer(&mut writer)?;
    }

    let b = buffer.into_boxed_slice();
    *size = b.len();

    Ok(Box::into_raw(b) as *const u8)
}
}

#[no_mangle]
pub unsafe extern "C" fn hll_buffer_free(ptr: *mut u8, insize: usize) {
    if ptr.is_null() {
        return;
    }
    drop(Vec::from_raw_parts(ptr, insize, insize));
}

use std::ffi::CStr;
use std::io;
use std::os::raw::c_char;
use std::slice;

use crate::cmd::ComputeParameters;
use crate::encodings::Molecule;
use crate::ffi::minhash::KmersketchMinHash;
use crate::ffi::utils::{ForeignObject, SketchStr};
use crate::signature::{save_signatures, Signature};
use crate::sketch::Sketch;

pub struct KmersketchSignature;

impl ForeignObject for KmersketchSignature {
    type RustObject = Signature;
}

pub struct KmersketchComputeParameters;

impl ForeignObject for KmersketchComputeParameters {
    type RustObject = ComputeParameters;
}

#[no_mangle]
pub unsafe extern "C" fn signature_new() -> *mut KmersketchSignature {
    KmersketchSignature::from_rust(Signature::default())
}

#[no_mangle]
pub unsafe extern "C" fn signature_from_params(
    ptr: *const KmersketchComputeParameters,
) -> *mut KmersketchSignature {
    let params = KmersketchComputeParameters::as_rust(ptr);

    KmersketchSignature::from_rust(Signature::from_params(params))
}

#[no_mangle]
pub unsafe extern "C" fn signature_free(ptr: *mut KmersketchSignature) {
    KmersketchSignature::drop(ptr);
}

#[no_mangle]
pub unsafe extern "C" fn signature_len(ptr: *const KmersketchSignature) -> usize {
    let sig = KmersketchSignature::as_rust(ptr);

    sig.size()
}

ffi_fn! {
unsafe fn signature_add_sequence(ptr: *mut KmersketchSignature, sequence: *const c_char, force: bool) ->
    Result<()> {
    let sig = KmersketchSignature::as_rust_mut(ptr);
    let c_str = {
        assert!(!sequence.is_null());

        CStr::from_ptr(sequence)
    };

    sig.add_sequence(c_str.to_bytes(), force)
}
}

ffi_fn! {
unsafe fn signature_add_protein(ptr: *mut KmersketchSignature, sequence: *const c_char) ->
    Result<()> {
    let sig = KmersketchSignature::as_rust_mut(ptr);
    let c_str = {
        assert!(!sequence.is_null());

        CStr::from_ptr(sequence)
    };

    sig.add_protein(c_str.to_bytes())
}
}

ffi_fn! {
unsafe fn signature_set_name(ptr: *mut KmersketchSignature, name: *const c_char) ->
    Result<()> {
    let sig = KmersketchSignature::as_rust_mut(ptr);
    let c_str = {
        assert!(!name.is_null());

        CStr::from_ptr(name)
    };

    sig.set_name(c_str.to_str()?);
    Ok(())
}
}

ffi_fn! {
unsafe fn signature_set_filename(ptr: *mut KmersketchSignature, name: *const c_char) ->
    Result<()> {
    let sig = KmersketchSignature::as_rust_mut(ptr);
    let c_str = {
        assert!(!name.is_null());

        CStr::from_ptr(name)
    };

    sig.set_filename(c_str.to_str()?);
    Ok(())
}
}

ffi_fn! {
unsafe fn signature_get_name(ptr: *const KmersketchSignature) -> Result<SketchStr> {
    let sig = KmersketchSignature::as_rust(ptr);

    Ok(sig.name().into())
}
}

ffi_fn! {
unsafe fn signature_get_filename(ptr: *const KmersketchSignature) -> Result<SketchStr> {
    let sig = KmersketchSignature::as_rust(ptr);

    Ok(sig.filename().into())
}
}

ffi_fn! {
unsafe fn signature_get_license(ptr: *const KmersketchSignature) -> Result<SketchStr> {
    let sig = KmersketchSignature::as_rust(ptr);

    Ok(sig.license().into())
}
}

ffi_fn! {
unsafe fn signature_md5sum(ptr: *const KmersketchSignature) -> Result<SketchStr> {
    let sig = KmersketchSignature::as_rust(ptr);

    Ok(sig.md5sum().into())
}
}

ffi_fn! {
unsafe fn signature_push_mh(ptr: *mut KmersketchSignature, other: *const KmersketchMinHash) ->
    Result<()> {
    let sig = KmersketchSignature::as_rust_mut(ptr);
    let mh = KmersketchMinHash::as_rust(other);

    sig.push(Sketch::MinHash(mh.clone()));
    Ok(())
}
}

ffi_fn! {
unsafe fn signature_first_mh(ptr: *const KmersketchSignature) -> Result<*mut KmersketchMinHash> {
    let sig = KmersketchSignature::as_rust(ptr);

    match sig.iter().find_map(|sk| {
        if let Sketch::MinHash(mh) = sk {
            Some(mh)
        } else {
            None
        }
    }) {
        Some(mh) => Ok(KmersketchMinHash::from_rust(mh.clone())),
        None => Ok(std::ptr::null_mut()),
    }
}
}

#[no_mangle]
pub unsafe extern "C" fn signature_eq(
    ptr: *const KmersketchSignature,
    other: *const KmersketchSignature,
) -> bool {
    let sig = KmersketchSignature::as_rust(ptr);
    let other_sig = KmersketchSignature::as_rust(other);

    sig == other_sig
}

ffi_fn! {
unsafe fn signature_save_json(ptr: *const KmersketchSignature) -> Result<SketchStr> {
    let sig = KmersketchSignature::as_rust(ptr);

    let mut buffer = vec![];
    sig.to_writer(&mut buffer)?;
    let st = std::str::from_utf8(&buffer)?;

    Ok(st.to_owned().into())
}
}

ffi_fn! {
unsafe fn signatures_save_buffer(
    ptr: *const *const KmersketchSignature,
    size: usize,
    compression: u8,
    osize: *mut usize,
) -> Result<*const u8> {
    let sigs = {
        assert!(!ptr.is_null());
        slice::from_raw_parts(ptr, size)
    };

    let rsigs: Vec<Signature> = sigs
        .iter()
        .map(|x| KmersketchSignature::as_rust(*x).clone())
        .collect();

    let mut buffer = vec![];
    let level = match compression {
        0 => None,
        1 => Some(niffler::compression::Level::One),
        2 => Some(niffler::compression::Level::Two),
        3 => Some(niffler::compression::Level::Three),
        4 => Some(niffler::compression::Level::Four),
        5 => Some(niffler::compression::Level::Five),
        6 => Some(niffler::compression::Level::Six),
        7 => Some(niffler::compression::Level::Seven),
        8 => Some(niffler::compression::Level::Eight),
        _ => Some(niffler::compression::Level::Nine),
    };
    save_signatures(&rsigs, &mut buffer, level)?;

    let b = buffer.into_boxed_slice();
    *osize = b.len();

    Ok(Box::into_raw(b) as *const u8)
}
}

#[no_mangle]
pub unsafe extern "C" fn signature_buffer_free(ptr: *mut u8, insize: usize) {
    if ptr.is_null() {
        return;
    }
    drop(Vec::from_raw_parts(ptr, insize, insize));
}

ffi_fn! {
unsafe fn signatures_load_buffer(
    ptr: *const c_char,
    insize: usize,
    ksize: usize,
    select_moltype: *const c_char,
    osize: *mut usize,
) -> Result<*mut *mut KmersketchSignature> {
    let buf = {
        assert!(!ptr.is_null());
        slice::from_raw_parts(ptr as *const u8, insize)
    };

    let moltype: Option<Molecule> = if select_moltype.is_null() {
        None
    } else {
        let mol = CStr::from_ptr(select_moltype).to_str()?;
        Some(mol.try_into()?)
    };

    let k = if ksize == 0 { None } else { Some(ksize) };

    let filtered_sigs =
        Signature::load_signatures(&mut io::Cursor::new(buf), k, moltype, None)?;

    let ptr_sigs: Vec<*mut KmersketchSignature> = filtered_sigs
        .into_iter()
        .map(|x| KmersketchSignature::from_rust(x))
        .collect();

    let b = ptr_sigs.into_boxed_slice();
    *osize = b.len();

    Ok(Box::into_raw(b) as *mut *mut KmersketchSignature)
}
}

use std::cmp;
use std::ffi;

use crate::errors::*;

/// Describes a version.
///
/// A version can only be compared to another version if they belong to the same API.
/// For example, both `Version::GL(3, 0) >= Version::ES(3, 0)` and `Version::ES(3, 0) >=
/// Version::GL(3, 0)` return `false`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Version {
    /// Regular OpenGL.
    GL(u8, u8),
    /// OpenGL embedded system.
    ES(u8, u8),
}

impl PartialOrd for Version {
    #[inline]
    fn partial_cmp(&self, other: &Version) -> Option<cmp::Ordering> {
        let (es1, major1, minor1) = match *self {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        let (es2, major2, minor2) = match *other {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        if es1 != es2 {
            None
        } else {
            match major1.cmp(&major2) {
                cmp::Ordering::Equal => Some(minor1.cmp(&minor2)),
                v => Some(v),
            }
        }
    }
}

impl Version {
    /// Obtains the OpenGL version of the current context using the loaded functions.
    ///
    /// # Unsafe
    ///
    /// You must ensure that the functions belong to the current context, otherwise you will get
    /// an undefined behavior.
    pub unsafe fn current() -> Result<Version> {
        let desc = gl::GetString(gl::VERSION);
        if desc.is_null() {
            return Err(Error::Backend("[GL] Version string is unavailable.".to_owned()));
        }

        let desc = ffi::CStr::from_ptr(desc as *const _).to_string_lossy().into_owned();
        Version::parse(&desc)
    }

    /// Parses strings like `"3.3.0 NVIDIA 390.77"` or `"OpenGL ES 3.0 Mesa"`.
    pub fn parse(desc: &str) -> Result<Version> {
        let malformed = || Error::Backend(format!("[GL] Version `{}` is malformed.", desc));

        let (es, desc) = if desc.starts_with("OpenGL ES-") {
            (true, desc.get(13..).unwrap_or(""))
        } else if desc.starts_with("OpenGL ES ") {
            (true, &desc[10..])
        } else {
            (false, desc)
        };

        let desc = desc.split(' ').next().ok_or_else(malformed)?;
        let mut iter = desc.split('.');
        let major = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(malformed)?;
        let minor = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(malformed)?;

        if es {
            Ok(Version::ES(major, minor))
        } else {
            Ok(Version::GL(major, minor))
        }
    }

    /// Returns true if the version supports `#version 330 core` programs with
    /// vertex array objects and instanced draws.
    pub fn is_supported(self) -> bool {
        self >= Version::GL(3, 3) || self >= Version::ES(3, 0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse() {
        assert_eq!(Version::parse("3.3.0 NVIDIA 390.77").unwrap(), Version::GL(3, 3));
        assert_eq!(Version::parse("OpenGL ES 3.0 Mesa").unwrap(), Version::ES(3, 0));
        assert!(Version::parse("garbage").is_err());

        assert!(Version::GL(4, 1).is_supported());
        assert!(!Version::GL(2, 1).is_supported());
        assert!(!(Version::GL(3, 0) >= Version::ES(3, 0)));
    }
}

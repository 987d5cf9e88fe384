use syn::{Attribute, LitStr};

pub(crate) const IGNORE_MARKER: &str = "-";

/// Parsed `#[scan(...)]` options of one field.
#[derive(Debug, Default)]
pub(crate) struct FieldAttrs {
    pub rename: Option<String>,
    pub skip: bool,
    pub embed: bool,
}

impl FieldAttrs {
    pub fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = FieldAttrs::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("scan")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let lit: LitStr = meta.value()?.parse()?;
                    if lit.value().is_empty() {
                        return Err(meta.error("`rename` must not be empty"));
                    }
                    parsed.rename = Some(lit.value());
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    parsed.skip = true;
                    Ok(())
                } else if meta.path.is_ident("embed") {
                    parsed.embed = true;
                    Ok(())
                } else {
                    Err(meta.error("unsupported scan attribute, expected `rename`, `skip` or `embed`"))
                }
            })?;
        }

        if parsed.rename.as_deref() == Some(IGNORE_MARKER) {
            parsed.skip = true;
        }
        Ok(parsed)
    }

    /// The rename recorded in the descriptor: the ignore marker for skipped
    /// fields, the explicit name otherwise.
    pub fn descriptor_rename(&self) -> Option<&str> {
        if self.skip {
            Some(IGNORE_MARKER)
        } else {
            self.rename.as_deref()
        }
    }
}

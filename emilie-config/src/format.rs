use proc_macro2::TokenStream;
use quote::quote;

/// Wrap expression tokens in syn::File and output formatted string
pub fn format_expr(tokens: TokenStream) -> syn::Result<String> {
    let file = quote! {
        static EXPR: ExprType = #tokens;
    };
    format_file(file)
}

/// Parse tokens of a whole file and pretty-print them
pub fn format_file(tokens: TokenStream) -> syn::Result<String> {
    let parsed = syn::parse_file(&tokens.to_string())?;
    Ok(prettyplease::unparse(&parsed))
}

#[cfg(test)]
pub fn assert_tokens_eq(left: TokenStream, right: TokenStream) {
    let left = format_expr(left).unwrap();
    let right = format_expr(right).unwrap();
    similar_asserts::assert_eq!(left, right);
}

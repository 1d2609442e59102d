use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, quote_spanned};
use syn::{parse_macro_input, spanned::Spanned, ItemFn};

/// Which attribute is being expanded; only used for diagnostics.
#[derive(Clone, Copy)]
enum Entry {
    Main,
    Test,
}

impl Entry {
    fn attr(self) -> &'static str {
        match self {
            Entry::Main => "#[async_result::main]",
            Entry::Test => "#[async_result::test]",
        }
    }
}

/// Rejects signatures `block_on` cannot drive.
fn check(input: &ItemFn, entry: Entry) -> Option<TokenStream2> {
    if input.sig.asyncness.is_none() {
        let msg = format!("{} requires an `async fn`", entry.attr());
        return Some(quote_spanned! { input.sig.fn_token.span()=>
            compile_error!(#msg);
        });
    }
    if matches!(entry, Entry::Main) && input.sig.ident != "main" {
        let msg = format!("only `async fn main` can be used for {}", entry.attr());
        return Some(quote_spanned! { input.sig.ident.span()=>
            compile_error!(#msg);
        });
    }
    if !input.sig.inputs.is_empty() {
        let msg = format!("{} functions cannot take arguments", entry.attr());
        return Some(quote_spanned! { input.sig.inputs.span()=>
            compile_error!(#msg);
        });
    }
    None
}

/// The synchronous body: an inner `async fn` carrying the user's attributes,
/// driven to completion on the crate's executor.
fn drive(input: &ItemFn) -> TokenStream2 {
    let attrs = &input.attrs;
    let output = &input.sig.output;
    let block = &input.block;
    quote! {
        #(#attrs)*
        async fn __run() #output {
            #block
        }

        ::async_result::runtime::block_on(__run())
    }
}

/// Runs an `async fn main` to completion on `async_result::runtime::block_on`.
#[proc_macro_attribute]
pub fn attr_macro_main(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    if let Some(err) = check(&input, Entry::Main) {
        return err.into();
    }

    let output = &input.sig.output;
    let body = drive(&input);
    quote! {
        pub fn main() #output {
            #body
        }
    }
    .into()
}

/// Turns an `async fn` into a `#[test]` driven by `async_result::runtime::block_on`.
///
/// The test may return anything a regular `#[test]` may return, such as
/// `Result<(), E>`.
#[proc_macro_attribute]
pub fn attr_macro_test(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    if let Some(err) = check(&input, Entry::Test) {
        return err.into();
    }

    let name = &input.sig.ident;
    let output = &input.sig.output;
    let body = drive(&input);
    quote! {
        #[test]
        fn #name() #output {
            #body
        }
    }
    .into()
}

use proc_macro::TokenStream;
use quote::quote;

#[derive(deluxe::ParseMetaItem)]
#[deluxe(attributes(scoring_feature))]
struct FeatureAttributes(syn::Ident, #[deluxe(flatten)] FeatureNamedAttributes);

#[derive(deluxe::ParseMetaItem)]
struct FeatureNamedAttributes {
  name: String,
  #[deluxe(default)]
  description: Option<String>,
}

/// Declares a unit struct implementing `Feature` around a descriptor
/// comparison function.
///
/// ```ignore
/// #[scoring_feature(BrightnessCloseness, name = "brightness_closeness", description = "...")]
/// fn score_feature(&self, lhs: &ImageDescriptor, rhs: &ImageDescriptor) -> f64 {
///   ...
/// }
/// ```
#[proc_macro_attribute]
pub fn scoring_feature(attrs: TokenStream, input: TokenStream) -> TokenStream {
  let FeatureAttributes(ident, FeatureNamedAttributes { name, description }) = match deluxe::parse2::<FeatureAttributes>(attrs.into()) {
    Ok(attrs) => attrs,
    Err(err) => return err.into_compile_error().into(),
  };

  let function = match syn::parse::<syn::ImplItemFn>(input) {
    Ok(function) => function,
    Err(err) => return err.into_compile_error().into(),
  };

  if function.sig.ident != "score_feature" {
    return syn::Error::new_spanned(&function.sig.ident, "scoring features must wrap a `score_feature` function").into_compile_error().into();
  }

  let description = description.unwrap_or_default();

  quote! {
      #[derive(Clone, Copy, Debug, Default)]
      pub struct #ident;

      impl Feature for #ident {
        fn name(&self) -> &'static str {
            #name
        }

        fn description(&self) -> &'static str {
            #description
        }

        #[tracing::instrument(level = "trace", name = #name, skip_all)]
        #function
      }
  }
  .into()
}

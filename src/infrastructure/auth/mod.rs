mod token_signer;

pub use token_signer::HmacTokenSigner;

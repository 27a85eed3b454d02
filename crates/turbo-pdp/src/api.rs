//! Storefront remote endpoints used by the product page.

use std::rc::Rc;

use async_trait::async_trait;
use turbo_data::{FetchClient, Transport};
use turbo_dom::FormData;

use crate::config::PdpConfig;
use crate::data::{CartAddData, OptionChangeData, ProductId};
use crate::error::ApiError;

/// Remote calls made by a product options controller.
#[async_trait(?Send)]
pub trait StorefrontApi {
    /// Price, stock and availability for the selection in `form`
    /// (an urlencoded option form).
    async fn option_change(
        &self,
        product_id: &ProductId,
        form: &str,
    ) -> Result<OptionChangeData, ApiError>;

    /// Add the product form's selection to the cart.
    async fn cart_add(&self, form: &FormData) -> Result<CartAddData, ApiError>;
}

#[async_trait(?Send)]
impl<T: StorefrontApi + ?Sized> StorefrontApi for Rc<T> {
    async fn option_change(
        &self,
        product_id: &ProductId,
        form: &str,
    ) -> Result<OptionChangeData, ApiError> {
        (**self).option_change(product_id, form).await
    }

    async fn cart_add(&self, form: &FormData) -> Result<CartAddData, ApiError> {
        (**self).cart_add(form).await
    }
}

/// [`StorefrontApi`] over the storefront's `/remote/v1` HTTP endpoints.
#[derive(Debug, Clone)]
pub struct HttpStorefrontApi {
    client: FetchClient,
}

impl HttpStorefrontApi {
    /// Create a new API client.
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    /// Create a client for `config.api_base_url` sending through `transport`.
    pub fn from_config(transport: Rc<dyn Transport>, config: &PdpConfig) -> Self {
        Self::new(FetchClient::from_shared(transport).with_base_url(config.api_base_url.clone()))
    }
}

#[async_trait(?Send)]
impl StorefrontApi for HttpStorefrontApi {
    async fn option_change(
        &self,
        product_id: &ProductId,
        form: &str,
    ) -> Result<OptionChangeData, ApiError> {
        let response = self
            .client
            .post(format!("/remote/v1/product-attributes/{}", product_id))
            .header("X-Requested-With", "XMLHttpRequest")
            .header("stencil-config", "{}")
            .accept("application/json")
            .form_encoded(form)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.data()?)
    }

    async fn cart_add(&self, form: &FormData) -> Result<CartAddData, ApiError> {
        let response = self
            .client
            .post("/remote/v1/cart/add")
            .header("X-Requested-With", "XMLHttpRequest")
            .accept("application/json")
            .multipart(form.iter())
            .send()
            .await?
            .error_for_status()?;

        Ok(response.data()?)
    }
}

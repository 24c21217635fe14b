//! # Product Commands

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pembukuan_core::ledger::plan_product;
use pembukuan_core::validation::{validate_amount, validate_product_name, validate_stock};
use pembukuan_core::{Product, ProductUpdate, Session, Table};
use pembukuan_db::{Gateway, GatewayExt, Query};

use crate::error::ServiceResult;
use crate::state::AppContext;

/// What the product form submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub price: i64,
    pub stock: i64,
}

/// All products, by name.
pub async fn list_products(ctx: &AppContext, session: &Session) -> ServiceResult<Vec<Product>> {
    let query = Query::new().order_by("name");
    Ok(ctx.gateway().query_as(session, &query).await?)
}

pub async fn create_product(
    ctx: &AppContext,
    session: &Session,
    input: ProductInput,
) -> ServiceResult<Product> {
    let new = plan_product(&input.name, input.price, input.stock)?;
    let product: Product = ctx.gateway().insert_as(session, &new).await?;

    info!(product_id = product.id, name = %product.name, price = product.price, "Product created");
    Ok(product)
}

/// Applies a partial edit. Past sales keep their frozen prices.
pub async fn update_product(
    ctx: &AppContext,
    session: &Session,
    id: i64,
    mut update: ProductUpdate,
) -> ServiceResult<()> {
    if let Some(name) = &update.name {
        update.name = Some(validate_product_name(name)?);
    }
    if let Some(price) = update.price {
        validate_amount("price", price)?;
    }
    if let Some(stock) = update.stock {
        validate_stock("stock", stock)?;
    }

    ctx.gateway()
        .update_with(session, Table::Products, id, &update)
        .await?;

    debug!(product_id = id, "Product updated");
    Ok(())
}

/// Deletes a product. Its sales stay, with `product_id` cleared.
pub async fn delete_product(ctx: &AppContext, session: &Session, id: i64) -> ServiceResult<()> {
    ctx.gateway().delete(session, Table::Products, id).await?;
    info!(product_id = id, "Product deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::sale::{list_sales, record_sale};
    use crate::error::{AuthError, ServiceError};
    use crate::testing::{fixture, today};
    use pembukuan_core::ledger::SaleInput;
    use pembukuan_core::PaymentMethod;

    fn input(name: &str, price: i64) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            price,
            stock: 10,
        }
    }

    #[tokio::test]
    async fn test_list_by_name() {
        let (ctx, _gw, session) = fixture();
        for (name, price) in [("Tekwan", 12000), ("Pempek Adaan", 4000), ("Model", 12000)] {
            create_product(&ctx, &session, input(name, price)).await.unwrap();
        }

        let names: Vec<String> = list_products(&ctx, &session)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["Model", "Pempek Adaan", "Tekwan"]);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let (ctx, _gw, session) = fixture();
        create_product(&ctx, &session, input("Pempek Lenjer", 5000)).await.unwrap();

        let err = create_product(&ctx, &session, input("Pempek Lenjer", 6000))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Persistence(_)));
    }

    #[tokio::test]
    async fn test_update_validates_fields() {
        let (ctx, _gw, session) = fixture();
        let product = create_product(&ctx, &session, input("Pempek Lenjer", 5000)).await.unwrap();

        let bad = ProductUpdate {
            stock: Some(-3),
            ..Default::default()
        };
        assert!(matches!(
            update_product(&ctx, &session, product.id, bad).await,
            Err(ServiceError::Validation(_))
        ));

        let rename = ProductUpdate {
            name: Some("  Lenjer Besar ".to_string()),
            ..Default::default()
        };
        update_product(&ctx, &session, product.id, rename).await.unwrap();
        assert_eq!(list_products(&ctx, &session).await.unwrap()[0].name, "Lenjer Besar");
    }

    #[tokio::test]
    async fn test_delete_keeps_sales() {
        let (ctx, _gw, session) = fixture();
        let product = create_product(&ctx, &session, input("Pempek Lenjer", 5000)).await.unwrap();
        record_sale(
            &ctx,
            &session,
            SaleInput {
                product_id: product.id,
                quantity: 2,
                payment_method: PaymentMethod::NonCash,
                customer_name: None,
                note: None,
            },
        )
        .await
        .unwrap();

        delete_product(&ctx, &session, product.id).await.unwrap();

        let sales = list_sales(&ctx, &session, today()).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].product_id, None);
        assert_eq!(sales[0].total, Some(10000));
    }

    #[tokio::test]
    async fn test_session_expiry_uses_context_clock() {
        let (ctx, _gw, mut session) = fixture();
        assert!(list_products(&ctx, &session).await.is_ok());

        session.expires_at = ctx.now() - chrono::Duration::seconds(1);
        let err = list_products(&ctx, &session).await.unwrap_err();
        assert!(matches!(err, ServiceError::Auth(AuthError::Unauthorized(_))));
    }
}

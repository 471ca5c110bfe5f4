use error_stack::ResultExt;
use google_sheets4::oauth2::{self, authenticator::Authenticator};

use super::http_client::{HttpClient, HttpsConnector};
use super::spreadsheet_manager::SpreadsheetManagerError;
use crate::adapters::config::sheets_config::SpreadsheetConfig;

pub async fn auth(
    config: &SpreadsheetConfig,
    client: HttpClient,
) -> error_stack::Result<Authenticator<HttpsConnector>, SpreadsheetManagerError> {
    let priv_key_path = config.priv_key.as_ref();
    let secret: oauth2::ServiceAccountKey = oauth2::read_service_account_key(priv_key_path)
        .await
        .change_context(SpreadsheetManagerError::AuthenticationFailed)
        .attach_printable_lazy(|| {
            format!(
                "Could not read service account private key at '{}'",
                priv_key_path
            )
        })?;

    oauth2::ServiceAccountAuthenticator::with_client(secret, client)
        .build()
        .await
        .change_context(SpreadsheetManagerError::AuthenticationFailed)
        .attach_printable("Could not create an authenticator")
}

// Admin API
//
// Form-based session login plus device CRUD under `/admin/api/devices`.
// Every admin call needs the session cookie that `login` stores in the
// client's jar.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::{LOGIN_PATH, NocClient};
use crate::error::Error;
use crate::models::{AdminDevice, DeviceDraft, MutationResponse};

const DEVICES_PATH: &str = "/admin/api/devices";

impl NocClient {
    /// Authenticate with username/password.
    ///
    /// `POST /auth/login` with a form body. The server answers with a
    /// redirect on success and `401` on bad credentials.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.url(LOGIN_PATH)?;
        debug!("logging in at {}", url);

        let form = [
            ("username", username),
            ("password", password.expose_secret()),
        ];
        let resp = self.http().post(url).form(&form).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", body.trim()),
            });
        }

        debug!("login successful");
        Ok(())
    }

    /// End the current session.
    ///
    /// `GET /auth/logout`
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.url("/auth/logout")?;
        debug!("logging out at {}", url);
        let _resp = self.http().get(url).send().await?;
        debug!("logout complete");
        Ok(())
    }

    /// List every configured device, newest first.
    ///
    /// `GET /admin/api/devices`
    pub async fn list_devices(&self) -> Result<Vec<AdminDevice>, Error> {
        self.get(DEVICES_PATH).await
    }

    /// `GET /admin/api/devices/{id}`
    pub async fn get_device(&self, id: i64) -> Result<AdminDevice, Error> {
        self.get(&format!("{DEVICES_PATH}/{id}")).await
    }

    /// Create a device. The response carries the new id.
    ///
    /// `POST /admin/api/devices`
    pub async fn create_device(&self, draft: &DeviceDraft) -> Result<MutationResponse, Error> {
        self.post(DEVICES_PATH, draft).await
    }

    /// `PUT /admin/api/devices/{id}`
    pub async fn update_device(
        &self,
        id: i64,
        draft: &DeviceDraft,
    ) -> Result<MutationResponse, Error> {
        self.put(&format!("{DEVICES_PATH}/{id}"), draft).await
    }

    /// `DELETE /admin/api/devices/{id}`. Unknown ids yield a 404 `Api` error.
    pub async fn delete_device(&self, id: i64) -> Result<MutationResponse, Error> {
        self.delete(&format!("{DEVICES_PATH}/{id}")).await
    }
}

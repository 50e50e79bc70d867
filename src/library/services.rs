//! Images with backing services started inside them, for integration tests

use crate::core::Pipeline;
use crate::error::ConstructionError;
use crate::library::build_image::BuildImage;
use crate::library::image::{couchbase, riak_kv, Image, ImageRegistry, ImageSource};
use crate::library::SYS_GROUP;

const COUCHBASE_STEPS: &str = r#"RUN set -exm \
&& apt-get update -y \
&& apt-get install -y curl \
&& apt-get clean \
&& COUCHBASE_URL="http://127.0.0.1:8091" \
&& COUCHBASE_MEMORY_QUOTA=2000 \
&& /entrypoint.sh couchbase-server & \
&& sleep 16 \
&& curl -v -X POST $COUCHBASE_URL/pools/default \
    -d memoryQuota=$COUCHBASE_MEMORY_QUOTA -d indexMemoryQuota=$COUCHBASE_MEMORY_QUOTA \
&& curl -v $COUCHBASE_URL/node/controller/setupServices -d services=kv%2cn1ql%2Cindex \
&& curl -v $COUCHBASE_URL/settings/web -d port=8091 -d username=Uconcourse -d password=Pconcourse0 \
&& fg 1"#;

const RIAK_KV_STEPS: &str = r#"RUN set -exm \
&& apt-get update -y \
&& apt-get install -y curl \
&& apt-get clean \
&& echo "storage_backend = leveldb" > /etc/riak/user.conf \
&& sed -i 's/^search = off/search = on/g' /etc/riak/riak.conf \
&& service riak restart"#;

const SERVICE_STEPS: &str = r##"RUN apt-get update && \
    apt-get install -yq runit wget python-httplib2 chrpath \
    lsof lshw sysstat net-tools numactl && \
    apt-get autoremove && apt-get clean && \
    rm -rf /var/lib/apt/lists/* /tmp/* /var/tmp/*

ARG CB_VERSION=5.0.0
ARG CB_RELEASE_URL=http://packages.couchbase.com/releases
ARG CB_PACKAGE=couchbase-server-enterprise_5.0.0-ubuntu16.04_amd64.deb
ARG CB_SHA256=2036fc6b10373b0959472ff8c0c44c5ac123a4147d94268d45d26e0e98cbf0b4

ENV PATH=$PATH:/opt/couchbase/bin:/opt/couchbase/bin/tools:/opt/couchbase/bin/install

RUN groupadd -g 1001 couchbase && useradd couchbase -u 1001 -g couchbase -M

RUN wget -N $CB_RELEASE_URL/$CB_VERSION/$CB_PACKAGE && \
    echo "$CB_SHA256  $CB_PACKAGE" | sha256sum -c - && \
    dpkg -i ./$CB_PACKAGE && rm -f ./$CB_PACKAGE

RUN mkdir -p /etc/service/couchbase-server && \
    echo "#!/bin/sh\n\nexec 2>&1\n\ncd /opt/couchbase" > /etc/service/couchbase-server/run && \
    echo "mkdir -p var/lib/couchbase/config var/lib/couchbase/data var/lib/couchbase/logs" \
        >> /etc/service/couchbase-server/run && \
    echo "chown -R couchbase:couchbase var" >> /etc/service/couchbase-server/run && \
    chmod 775 /etc/service/couchbase-server/run

RUN chrpath -r '$ORIGIN/../lib' /opt/couchbase/bin/curl

EXPOSE 8091 8092 8093 8094 11207 11210 11211 18091 18092 18093
VOLUME /opt/couchbase/var

CMD ["/usr/bin/runsvdir-start"]"##;

/// Where service images are pushed
#[derive(Debug, Clone)]
pub struct ServiceImages {
    pub registry: ImageRegistry,
    /// Repository prefix, e.g. `dev` for `dev/couchbase-image`
    pub namespace: String,
}

impl ServiceImages {
    pub fn new(registry: ImageRegistry, namespace: impl Into<String>) -> Self {
        Self {
            registry,
            namespace: namespace.into(),
        }
    }

    /// Image tagged per team, or per pipeline, through scope placeholders
    fn image(&self, name: &str, tag: &str) -> Image {
        Image::new(
            format!("{}-image", name),
            ImageSource::new(
                self.registry.clone(),
                format!("{}/{}-image", self.namespace, name),
            )
            .with_tag(tag),
        )
    }

    fn build(
        &self,
        pipeline: &mut Pipeline,
        build: BuildImage,
    ) -> Result<Image, ConstructionError> {
        let image = build.image.clone();
        build.in_group(SYS_GROUP).add_to(pipeline)?;
        Ok(image)
    }

    /// Couchbase with its services configured, built on `linux`
    pub fn couchbase_image(
        &self,
        pipeline: &mut Pipeline,
        linux: &Image,
    ) -> Result<Image, ConstructionError> {
        let image = self.image("couchbase", "{{ team }}");
        let build = BuildImage::new("couchbase", image, linux.clone())
            .with_prepare_image(couchbase())
            .with_dockerfile_steps(COUCHBASE_STEPS);
        self.build(pipeline, build)
    }

    /// Riak KV with the leveldb backend and search enabled, built on `linux`
    pub fn riak_kv_image(
        &self,
        pipeline: &mut Pipeline,
        linux: &Image,
    ) -> Result<Image, ConstructionError> {
        let image = self.image("riak-kv", "{{ team }}");
        let build = BuildImage::new("riak-kv", image, linux.clone())
            .with_prepare_image(riak_kv())
            .with_dockerfile_steps(RIAK_KV_STEPS);
        self.build(pipeline, build)
    }

    /// Application base image with a runit supervised Couchbase, one per pipeline
    pub fn service_image(
        &self,
        pipeline: &mut Pipeline,
        linux: &Image,
        base: &Image,
    ) -> Result<Image, ConstructionError> {
        let image = self.image("service", "{{ pipeline }}");
        let build = BuildImage::new("service", image, base.clone())
            .with_prepare_image(linux.clone())
            .with_dockerfile_steps(SERVICE_STEPS);
        self.build(pipeline, build)
    }
}
